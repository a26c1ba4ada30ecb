//! Tests for progress tracking across a batch of styles

#[cfg(test)]
mod tests {
    use renaissance::io::progress::ProgressManager;
    use renaissance::training::trainer::{LossSample, TrainingObserver};
    use std::path::Path;

    // Tests step updates move the current style bar
    // Verified by ignoring on_step
    #[test]
    fn test_step_updates() {
        let mut pm = ProgressManager::hidden();
        pm.initialize(2);
        pm.start_style(Path::new("Styles/a.png"), 10);

        pm.on_step(3, 10);

        assert_eq!(pm.current_step(), 3);
        assert_eq!(pm.completed_styles(), 0);
    }

    // Tests completing a style advances the batch and resets the step bar
    // Verified by not incrementing the batch bar
    #[test]
    fn test_complete_style() {
        let mut pm = ProgressManager::hidden();
        pm.initialize(2);
        pm.start_style(Path::new("a.png"), 4);
        pm.on_step(4, 4);
        pm.complete_style();

        assert_eq!(pm.completed_styles(), 1);
        assert_eq!(pm.current_step(), 0);

        pm.start_style(Path::new("b.png"), 4);
        pm.complete_style();
        pm.finish();

        assert_eq!(pm.completed_styles(), 2);
    }

    // Tests logged samples are remembered until the next style starts
    // Verified by not resetting last_loss in start_style
    #[test]
    fn test_last_loss() {
        let mut pm = ProgressManager::hidden();
        pm.initialize(1);
        pm.start_style(Path::new("a.png"), 4);
        assert_eq!(pm.last_loss(), None);

        pm.on_log(&LossSample {
            step: 0,
            total: 12.5,
            content: 0.0,
            style: 1.25e-5,
        });
        assert_eq!(pm.last_loss(), Some(12.5));

        pm.start_style(Path::new("b.png"), 4);
        assert_eq!(pm.last_loss(), None);
    }

    // Tests a manager without an initialised batch does not panic
    // Verified by unwrapping the batch bar
    #[test]
    fn test_uninitialised_manager() {
        let mut pm = ProgressManager::hidden();
        pm.on_step(1, 1);
        pm.complete_style();
        pm.finish();

        assert_eq!(pm.completed_styles(), 0);
    }

    // Tests abandoning mid-style detaches both bars
    // Verified by leaving the batch bar attached
    #[test]
    fn test_abandon_clears_bars() {
        let mut pm = ProgressManager::hidden();
        pm.initialize(3);
        pm.start_style(Path::new("a.png"), 10);
        pm.on_step(4, 10);
        assert!(pm.is_active());

        pm.abandon();

        assert!(!pm.is_active());
        assert_eq!(pm.current_step(), 0);
        assert_eq!(pm.completed_styles(), 0);
    }
}
