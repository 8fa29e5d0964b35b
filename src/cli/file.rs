//! Шифрование файлов ключом (AES-CBC + HMAC) и генерация ключей

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::crypto::{
    AeAlgorithm, AeadAlgorithm, AeadCipher, ComposedCipher, DigestAlgorithm, DigestEngine,
    SecureBytes,
};
use crate::encoding::Encoding;
use crate::error::Result;

use super::progress::ProgressLine;
use super::{Context, Report};

#[derive(Debug, Clone, Args)]
pub struct FileArgs {
    pub input: PathBuf,

    pub output: PathBuf,

    /// Составной ключ MAC_KEY || ENC_KEY в выбранной кодировке
    #[arg(short, long)]
    pub key: String,

    /// aes-128-cbc-hmac-sha256, aes-192-cbc-hmac-sha384, aes-256-cbc-hmac-sha384 или aes-256-cbc-hmac-sha512
    #[arg(short, long)]
    pub algorithm: Option<AeAlgorithm>,

    #[arg(short, long)]
    pub encoding: Option<Encoding>,

    /// Показывать прогресс
    #[arg(long)]
    pub progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyKind {
    /// Ключ AES-GCM
    Aead,
    /// Составной ключ CBC + HMAC
    Composed,
    /// Ключ HMAC
    Hmac,
}

#[derive(Debug, Clone, Args)]
pub struct KeygenArgs {
    #[arg(value_enum, default_value_t = KeyKind::Composed)]
    pub kind: KeyKind,

    /// Алгоритм для выбранного типа ключа (по умолчанию - из настроек)
    #[arg(short, long)]
    pub algorithm: Option<String>,

    #[arg(short, long)]
    pub encoding: Option<Encoding>,
}

fn cipher_for(ctx: &Context, args: &FileArgs) -> Result<(ComposedCipher, Encoding)> {
    let encoding = ctx.encoding(args.encoding);
    let algorithm = args.algorithm.unwrap_or(ctx.settings.ae_algorithm);
    let key = SecureBytes::new(encoding.decode(&args.key)?);
    let cipher = ComposedCipher::from_composite_key(algorithm, &key)?
        .with_chunk_size(ctx.settings.chunk_size);
    Ok((cipher, encoding))
}

pub fn encrypt(ctx: &Context, args: &FileArgs) -> Result<Report> {
    let (cipher, encoding) = cipher_for(ctx, args)?;

    let mut progress = ProgressLine::new("Шифрование", args.progress && !ctx.json);
    let sealed = cipher.encrypt_file_with_progress(&args.input, &args.output, |event| {
        progress.update(event)
    })?;
    progress.finish();

    Ok(Report::success("Файл зашифрован")
        .with_encoding(encoding)
        .field("алгоритм", cipher.algorithm())
        .field("iv", encoding.encode(&sealed.iv))
        .field("тег", encoding.encode(&sealed.tag))
        .field("байт открытого текста", sealed.plaintext_len)
        .field("байт шифртекста", sealed.ciphertext_len)
        .field("файл", args.output.display()))
}

pub fn decrypt(ctx: &Context, args: &FileArgs) -> Result<Report> {
    let (cipher, _) = cipher_for(ctx, args)?;

    let mut progress = ProgressLine::new("Расшифровка", args.progress && !ctx.json);
    let written = cipher.decrypt_file_with_progress(&args.input, &args.output, |event| {
        progress.update(event)
    })?;
    progress.finish();

    Ok(Report::success("Файл расшифрован")
        .field("алгоритм", cipher.algorithm())
        .field("байт", written)
        .field("файл", args.output.display()))
}

pub fn keygen(ctx: &Context, args: &KeygenArgs) -> Result<Report> {
    let encoding = ctx.encoding(args.encoding);
    let algorithm = args.algorithm.as_deref();

    let (name, key) = match args.kind {
        KeyKind::Aead => {
            let alg = match algorithm {
                Some(s) => s.parse::<AeadAlgorithm>()?,
                None => ctx.settings.aead_algorithm,
            };
            (alg.to_string(), AeadCipher::new(alg).generate_key())
        }
        KeyKind::Composed => {
            let alg = match algorithm {
                Some(s) => s.parse::<AeAlgorithm>()?,
                None => ctx.settings.ae_algorithm,
            };
            (alg.to_string(), ComposedCipher::generate(alg).composite_key())
        }
        KeyKind::Hmac => {
            let alg = match algorithm {
                Some(s) => s.parse::<DigestAlgorithm>()?,
                None => ctx.settings.digest_algorithm,
            };
            (alg.to_string(), DigestEngine::generate_hmac_key(alg))
        }
    };

    Ok(Report::success("Ключ сгенерирован")
        .with_encoding(encoding)
        .field("алгоритм", name)
        .field("байт", key.len())
        .field("ключ", encoding.encode(&key)))
}
