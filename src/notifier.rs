use log::error;

/// Told when a connection attempt fails
///
/// How the failure is presented (dialog, log line, metric) is up to the implementor. Must not
/// panic.
pub trait ConnectionNotifier {
    fn notify(&self, title: &str, message: &str);
}

impl<F: Fn(&str, &str)> ConnectionNotifier for F {
    fn notify(&self, title: &str, message: &str) {
        self(title, message)
    }
}

/// Reports failures through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ConnectionNotifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        error!("{}: {}", title, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_closure_notifier() {
        let seen = RefCell::new(Vec::new());
        let notifier = |title: &str, message: &str| {
            seen.borrow_mut().push(format!("{}/{}", title, message));
        };
        notifier.notify("Error Connecting", "Try Another port");
        assert_eq!(*seen.borrow(), vec!["Error Connecting/Try Another port"]);
    }
}
