use colored::Colorize;

use crate::reconcile::ReconcileNotifier;

pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        ConsoleNotifier
    }
}

impl ReconcileNotifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        let (verb, rest) = message.split_once(' ').unwrap_or((message, ""));
        let verb = match verb {
            "created" | "added" | "deployed" => verb.green(),
            "updated" => verb.yellow(),
            _ => verb.normal(),
        };

        println!("{} {}", verb, rest);
    }
}
