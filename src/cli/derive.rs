//! Получение ключа из пароля (PBKDF2)

use clap::Args;
use secrecy::ExposeSecret;

use crate::crypto::kdf::DEFAULT_KEY_LEN;
use crate::crypto::{Pbkdf2, Prf};
use crate::encoding::Encoding;
use crate::error::Result;

use super::{prompt_password, Context, Report};

#[derive(Debug, Clone, Args)]
pub struct DeriveArgs {
    /// Длина ключа в байтах
    #[arg(short, long, default_value_t = DEFAULT_KEY_LEN)]
    pub length: usize,

    /// Соль в выбранной кодировке (по умолчанию - случайная)
    #[arg(short, long)]
    pub salt: Option<String>,

    /// Число итераций (по умолчанию - из настроек или минимум для PRF)
    #[arg(short, long)]
    pub iterations: Option<u32>,

    /// PRF: hmac-sha1, hmac-sha256, hmac-sha384, hmac-sha512
    #[arg(short, long)]
    pub prf: Option<Prf>,

    #[arg(short, long)]
    pub encoding: Option<Encoding>,
}

pub fn run(ctx: &Context, args: &DeriveArgs) -> Result<Report> {
    let password = prompt_password()?;
    derive_with(ctx, args, password.expose_secret())
}

fn derive_with(ctx: &Context, args: &DeriveArgs, password: &str) -> Result<Report> {
    let encoding = ctx.encoding(args.encoding);
    let prf = args.prf.unwrap_or(ctx.settings.prf);
    let salt = args.salt.as_deref().map(|s| encoding.decode(s)).transpose()?;

    // Итерации из настроек подходят только к PRF из настроек
    let iterations = args.iterations.or_else(|| {
        (prf == ctx.settings.prf)
            .then_some(ctx.settings.iterations)
            .flatten()
    });

    let derived = Pbkdf2::new(prf).derive_key(password, args.length, salt.as_deref(), iterations)?;

    Ok(Report::success("Ключ получен")
        .with_encoding(encoding)
        .field("prf", derived.prf)
        .field("итерации", derived.iterations)
        .field("соль", encoding.encode(&derived.salt))
        .field("ключ", encoding.encode(&derived.key)))
}
