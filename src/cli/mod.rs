//! Реализация CLI команд

pub mod derive;
pub mod file;
pub mod hash;
pub mod progress;
pub mod report;
pub mod seal;

use colored::Colorize;
use secrecy::{ExposeSecret, SecretString};

use crate::config::Settings;
use crate::crypto::constant_time_eq;
use crate::encoding::Encoding;
use crate::error::{CryptoError, Result};

pub use report::Report;

/// Минимальная длина пароля для новых конвертов
pub const MIN_PASSWORD_LEN: usize = 12;

/// Общие параметры, доступные всем командам
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub json: bool,
}

impl Context {
    pub fn new(settings: Settings, json: bool) -> Self {
        Self { settings, json }
    }

    /// Кодировка: явно указанная или из настроек
    pub fn encoding(&self, explicit: Option<Encoding>) -> Encoding {
        explicit.unwrap_or(self.settings.encoding)
    }
}

/// Запросить новый пароль с подтверждением
pub fn prompt_new_password() -> Result<SecretString> {
    eprintln!("{}", "Создание пароля".cyan().bold());
    eprintln!("Минимальная длина: {} символов\n", MIN_PASSWORD_LEN);

    loop {
        let password = SecretString::new(rpassword::prompt_password("Введите пароль: ")?);

        if password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
            eprintln!(
                "{} Пароль должен содержать минимум {} символов",
                "Ошибка:".red(),
                MIN_PASSWORD_LEN
            );
            continue;
        }

        let confirm = SecretString::new(rpassword::prompt_password("Подтвердите пароль: ")?);

        if !passwords_match(&password, &confirm) {
            eprintln!("{} Пароли не совпадают", "Ошибка:".red());
            continue;
        }

        return Ok(password);
    }
}

fn passwords_match(a: &SecretString, b: &SecretString) -> bool {
    constant_time_eq(a.expose_secret().as_bytes(), b.expose_secret().as_bytes())
}

/// Запросить существующий пароль
pub fn prompt_password() -> Result<SecretString> {
    let password = SecretString::new(rpassword::prompt_password("Введите пароль: ")?);
    if password.expose_secret().trim().is_empty() {
        return Err(CryptoError::PasswordRequired);
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[test]
    fn test_passwords_match() {
        assert!(passwords_match(&secret("correct horse"), &secret("correct horse")));
        assert!(!passwords_match(&secret("correct horse"), &secret("correct horsf")));
        assert!(!passwords_match(&secret("correct horse"), &secret("correct hors")));
    }

    #[test]
    fn test_context_encoding_fallback() {
        let ctx = Context::new(Settings::default(), false);
        assert_eq!(ctx.encoding(None), Encoding::Hex);
        assert_eq!(ctx.encoding(Some(Encoding::Base64)), Encoding::Base64);
    }
}
