//! Итог выполнения команды: текст для терминала или JSON

use colored::Colorize;
use serde::Serialize;

use crate::encoding::Encoding;

/// Неизменяемая запись о результате операции
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,
    /// Поля полезной нагрузки в порядке добавления
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<(String, String)>,
}

impl Report {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            encoding: None,
            fields: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::success(message)
        }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((name.into(), value.to_string()));
        self
    }

    pub fn print(&self, json: bool) {
        if json {
            match serde_json::to_string_pretty(self) {
                Ok(text) => println!("{}", text),
                Err(e) => eprintln!("{} {}", "Ошибка:".red().bold(), e),
            }
            return;
        }

        if self.success {
            println!("{}", self.message.green().bold());
        } else {
            println!("{}", self.message.red().bold());
        }
        for (name, value) in &self.fields {
            println!("  {} {}", format!("{}:", name).cyan(), value);
        }
    }
}
