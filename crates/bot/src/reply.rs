use async_trait::async_trait;

/// Who sees a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only the invoking user (ephemeral).
    Private,
    /// Everyone in the channel.
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub visibility: Visibility,
}

impl Reply {
    pub fn private(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            visibility: Visibility::Private,
        }
    }

    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            visibility: Visibility::Public,
        }
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }
}

/// Outbound side of one invocation.
///
/// A platform allows one initial reply per invocation; anything after that
/// must go out as a follow-up.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, reply: Reply) -> anyhow::Result<()>;

    async fn follow_up(&self, reply: Reply) -> anyhow::Result<()>;

    fn has_replied(&self) -> bool;
}
