use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Неверная длина ключа: ожидалось {expected} байт, получено {actual}")]
    InvalidKey { expected: usize, actual: usize },

    #[error("Неверная длина nonce/IV: ожидалось {expected} байт, получено {actual}")]
    InvalidNonce { expected: usize, actual: usize },

    #[error("Ошибка аутентификации: данные повреждены или ключ неверный")]
    AuthenticationFailed,

    #[error("Неверное выравнивание (padding) после расшифровки")]
    InvalidPadding,

    #[error("Неверная длина дайджеста: ожидалось {expected} байт, получено {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Диапазон [{offset}, {offset}+{count}) выходит за пределы данных длиной {len} байт")]
    InvalidRange { offset: u64, count: u64, len: u64 },

    #[error("Файл '{}' не найден", .0.display())]
    FileNotFound(PathBuf),

    #[error("Пароль обязателен")]
    PasswordRequired,

    #[error("Неверная длина: {0}")]
    InvalidLength(String),

    #[error("Слишком мало итераций: минимум {minimum}, получено {actual}")]
    IterationCountTooLow { minimum: u32, actual: u32 },

    #[error("Неверная кодировка: {0}")]
    InvalidEncoding(String),

    #[error("Неподдерживаемый формат: {0}")]
    UnsupportedFormat(String),

    #[error("Неверная конфигурация: {0}")]
    InvalidConfig(String),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CryptoError {
    /// Map an open/read failure on `path` to `FileNotFound` when the path does
    /// not resolve, keeping every other I/O error as is.
    pub(crate) fn from_io_at(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            CryptoError::FileNotFound(path.to_path_buf())
        } else {
            CryptoError::Io(err)
        }
    }
}
