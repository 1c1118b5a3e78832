use super::runtime::BoxFuture;

/// Asks the user whether unsaved changes in a tab may be thrown away.
pub trait DiscardPrompt: Send + Sync {
    fn confirm_discard<'a>(&'a self, tab_title: &'a str) -> BoxFuture<'a, bool>;
}

/// Prompt that always answers the same way. Useful for headless drivers.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl DiscardPrompt for FixedAnswer {
    fn confirm_discard<'a>(&'a self, _tab_title: &'a str) -> BoxFuture<'a, bool> {
        let answer = self.0;
        Box::pin(async move { answer })
    }
}
