/// Lifecycle of one insertion-dialog session.
///
/// `Settling` covers the window between the dialog closing and the rollback
/// decision, which waits for uploads the session started to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialogState {
    #[default]
    Closed,
    Open,
    Settling,
    Confirmed,
    Cancelled,
}
