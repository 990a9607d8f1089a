/// How a toast should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

/// A transient, user-visible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: ToastKind::Error,
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: ToastKind::Info,
        }
    }
}

/// Where the session reports failures the user should see.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}
