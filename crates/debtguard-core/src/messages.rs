use serde::{Deserialize, Serialize};

/// Banner prefixed to every compacted memory turn.
pub const MEMORY_BANNER: &str = "**🔄 Contexto Compactado Exitosamente:**";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
    MemorySummary,
}

/// Speaker labels used when a log is flattened into prompt text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleLabels {
    pub user: &'static str,
    pub other: &'static str,
}

impl RoleLabels {
    /// Labels for the per-turn conversation prompt.
    pub const CHAT: RoleLabels = RoleLabels { user: "Tú", other: "IA" };
    /// Labels for the compaction transcript.
    pub const TRANSCRIPT: RoleLabels = RoleLabels { user: "Usuario", other: "IA" };

    pub fn for_role(&self, role: TurnRole) -> &'static str {
        match role {
            TurnRole::User => self.user,
            TurnRole::Assistant | TurnRole::MemorySummary => self.other,
        }
    }
}

/// A single immutable entry of the conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    role: TurnRole,
    content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: TurnRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: TurnRole::Assistant, content: content.into() }
    }

    // Only reachable through `ConversationLog::compacted`.
    fn memory_summary(summary: &str) -> Self {
        Self {
            role: TurnRole::MemorySummary,
            content: format!("{MEMORY_BANNER}\n\n{summary}"),
        }
    }

    pub fn role(&self) -> TurnRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn render(&self, labels: RoleLabels) -> String {
        format!("{}: {}", labels.for_role(self.role), self.content)
    }
}

/// Ordered chat history. Insertion order is both display and prompt order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    turns: Vec<ChatTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding exactly one memory-summary turn.
    pub fn compacted(summary: &str) -> Self {
        Self { turns: vec![ChatTurn::memory_summary(summary)] }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::assistant(content));
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn is_compacted(&self) -> bool {
        matches!(self.turns.as_slice(), [turn] if turn.role == TurnRole::MemorySummary)
    }

    /// Each turn as `"<label>: <content>"`, newline-joined, in order.
    pub fn render(&self, labels: RoleLabels) -> String {
        self.turns
            .iter()
            .map(|t| t.render(labels))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushes_preserve_order() {
        let mut log = ConversationLog::new();
        log.push_user("A");
        log.push_assistant("r1");
        log.push_user("B");
        let roles: Vec<_> = log.turns().iter().map(ChatTurn::role).collect();
        assert_eq!(roles, vec![TurnRole::User, TurnRole::Assistant, TurnRole::User]);
        assert_eq!(log.last().map(ChatTurn::content), Some("B"));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn render_uses_chat_labels() {
        let mut log = ConversationLog::new();
        log.push_user("hola");
        log.push_assistant("buenas");
        assert_eq!(log.render(RoleLabels::CHAT), "Tú: hola\nIA: buenas");
        assert_eq!(log.render(RoleLabels::TRANSCRIPT), "Usuario: hola\nIA: buenas");
    }

    #[test]
    fn memory_summary_rendered_as_model_voice() {
        let log = ConversationLog::compacted("s");
        assert_eq!(
            log.render(RoleLabels::CHAT),
            "IA: **🔄 Contexto Compactado Exitosamente:**\n\ns"
        );
    }

    #[test]
    fn compacted_log_has_single_summary_turn() {
        let log = ConversationLog::compacted("summary-x");
        assert_eq!(log.len(), 1);
        assert!(log.is_compacted());
        let turn = &log.turns()[0];
        assert_eq!(turn.role(), TurnRole::MemorySummary);
        assert_eq!(turn.content(), "**🔄 Contexto Compactado Exitosamente:**\n\nsummary-x");
    }

    #[test]
    fn appending_after_compaction_is_no_longer_compacted() {
        let mut log = ConversationLog::compacted("s");
        log.push_user("next");
        assert!(!log.is_compacted());
        assert_eq!(log.turns()[0].role(), TurnRole::MemorySummary);
    }

    #[test]
    fn empty_log_renders_empty() {
        let log = ConversationLog::new();
        assert!(log.is_empty());
        assert_eq!(log.render(RoleLabels::CHAT), "");
    }

    #[test]
    fn turn_serde_shape() {
        let json = serde_json::to_value(ChatTurn::assistant("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "ok"}));
    }
}
