use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use services::QuizWorkflowService;

pub trait UiApp: Send + Sync {
    /// Test to open straight away, as given on the command line.
    fn launch_test(&self) -> Option<String>;

    fn workflow(&self) -> Arc<QuizWorkflowService>;
}

#[derive(Clone)]
pub struct AppContext {
    launch_test_configured: Option<String>,
    launch_test_once: Arc<AtomicBool>,

    workflow: Arc<QuizWorkflowService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        let launch_test_configured = app.launch_test();

        Self {
            launch_test_once: Arc::new(AtomicBool::new(launch_test_configured.is_some())),
            launch_test_configured,
            workflow: app.workflow(),
        }
    }

    /// The launch test, handed out once so returning to the list stays there.
    #[must_use]
    pub fn take_launch_test(&self) -> Option<String> {
        if self.launch_test_once.swap(false, Ordering::AcqRel) {
            self.launch_test_configured.clone()
        } else {
            None
        }
    }

    #[must_use]
    pub fn launch_test_configured(&self) -> Option<&str> {
        self.launch_test_configured.as_deref()
    }

    #[must_use]
    pub fn workflow(&self) -> Arc<QuizWorkflowService> {
        Arc::clone(&self.workflow)
    }
}

// Provided by the composition root in `crates/app`.

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::Clock;
    use storage::InMemoryRepository;

    struct LaunchApp(Option<String>);

    impl UiApp for LaunchApp {
        fn launch_test(&self) -> Option<String> {
            self.0.clone()
        }

        fn workflow(&self) -> Arc<QuizWorkflowService> {
            Arc::new(QuizWorkflowService::new(
                Clock::default_clock(),
                Arc::new(InMemoryRepository::new()),
            ))
        }
    }

    #[test]
    fn launch_test_is_handed_out_once() {
        let app: Arc<dyn UiApp> = Arc::new(LaunchApp(Some("net".into())));
        let ctx = build_app_context(&app);
        let clone = ctx.clone();

        assert_eq!(clone.take_launch_test().as_deref(), Some("net"));
        assert_eq!(ctx.take_launch_test(), None);
        assert_eq!(ctx.launch_test_configured(), Some("net"));
    }

    #[test]
    fn no_launch_test_configured() {
        let app: Arc<dyn UiApp> = Arc::new(LaunchApp(None));
        assert_eq!(build_app_context(&app).take_launch_test(), None);
    }
}
