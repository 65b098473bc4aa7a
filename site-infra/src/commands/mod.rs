mod apply;
mod completion;
mod console_notify;
mod zones;

pub use apply::{apply, ApplyArgs};
pub use completion::{completion, CompletionArgs};
pub use zones::zones;

use crate::cloudflare::{AccountCloudflareApi, CloudflareTokenAuth};
use crate::config::InfraConfig;
use crate::error::InfraError;

fn cloudflare_api(config: &InfraConfig) -> Result<AccountCloudflareApi, InfraError> {
    let token_auth = CloudflareTokenAuth::new(&config.api_token)?;

    AccountCloudflareApi::new(
        config.api_base_url.clone(),
        config.account_id.clone(),
        Box::new(token_auth),
    )
}
