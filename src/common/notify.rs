// src/common/notify.rs

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

// Uma notificação não bloqueante (o "toast" da tela)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Fila de notificações compartilhada por todas as views do processo.
///
/// As views empurram mensagens; quem renderiza a próxima página esvazia a fila.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    queue: Arc<Mutex<Vec<Notification>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Level::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Level::Error, message.into());
    }

    /// Retira tudo o que estava pendente.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    pub fn pending(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    fn push(&self, level: Level, message: String) {
        self.lock().push(Notification { level, message });
    }

    // Um painel de toasts envenenado não deve derrubar a view
    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
