//! Вычисление и проверка дайджестов

use std::path::Path;

use clap::Args;

use crate::crypto::{DigestAlgorithm, DigestEngine, SecureBytes, SeekWindow};
use crate::encoding::Encoding;
use crate::error::{CryptoError, Result};

use super::progress::ProgressLine;
use super::{Context, Report};

#[derive(Debug, Clone, Args)]
pub struct HashArgs {
    /// Строка для хеширования или путь к файлу (вместе с --file)
    pub input: String,

    /// Считать INPUT путём к файлу
    #[arg(short, long)]
    pub file: bool,

    /// Алгоритм: md5, sha1, sha256, sha384, sha512
    #[arg(short, long)]
    pub algorithm: Option<DigestAlgorithm>,

    /// Ключ HMAC в выбранной кодировке (без ключа - обычный хеш)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Начало диапазона в байтах
    #[arg(long)]
    pub offset: Option<u64>,

    /// Длина диапазона в байтах (по умолчанию - до конца)
    #[arg(long)]
    pub count: Option<u64>,

    /// Кодировка вывода и ключей: hex или base64
    #[arg(short, long)]
    pub encoding: Option<Encoding>,

    /// Показывать прогресс для файлов
    #[arg(long)]
    pub progress: bool,
}

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub target: HashArgs,

    /// Ожидаемый дайджест в выбранной кодировке
    #[arg(long)]
    pub expected: String,
}

struct Prepared {
    algorithm: DigestAlgorithm,
    encoding: Encoding,
    key: Option<SecureBytes>,
    window: Option<SeekWindow>,
    engine: DigestEngine,
}

fn prepare(ctx: &Context, args: &HashArgs) -> Result<Prepared> {
    let algorithm = args.algorithm.unwrap_or(ctx.settings.digest_algorithm);
    let encoding = ctx.encoding(args.encoding);
    let key = args
        .key
        .as_deref()
        .map(|k| encoding.decode(k).map(SecureBytes::new))
        .transpose()?;

    let window = match (args.offset, args.count) {
        (None, None) => None,
        (offset, Some(count)) => Some(SeekWindow::new(offset.unwrap_or(0), count)),
        (Some(offset), None) => {
            let len = input_len(args)?;
            Some(SeekWindow::new(offset, len.saturating_sub(offset)))
        }
    };

    Ok(Prepared {
        algorithm,
        encoding,
        key,
        window,
        engine: DigestEngine::new(ctx.settings.chunk_size),
    })
}

fn input_len(args: &HashArgs) -> Result<u64> {
    if args.file {
        let path = Path::new(&args.input);
        let metadata = std::fs::metadata(path).map_err(|e| CryptoError::from_io_at(e, path))?;
        Ok(metadata.len())
    } else {
        Ok(args.input.len() as u64)
    }
}

pub fn run(ctx: &Context, args: &HashArgs) -> Result<Report> {
    let p = prepare(ctx, args)?;
    let key = p.key.as_deref();

    let digest = if args.file {
        let mut progress = ProgressLine::new("Хеширование", args.progress && !ctx.json);
        let digest = p.engine.compute_file_with_progress(
            Path::new(&args.input),
            p.window,
            p.algorithm,
            key,
            |event| progress.update(event),
        )?;
        progress.finish();
        digest
    } else {
        match p.window {
            Some(window) => p
                .engine
                .compute_bytes_range(args.input.as_bytes(), window, p.algorithm, key)?,
            None => p.engine.compute_str(&args.input, p.algorithm, key)?,
        }
    };

    let mut report = Report::success("Дайджест вычислен")
        .with_encoding(p.encoding)
        .field("алгоритм", p.algorithm)
        .field("hmac", digest.is_keyed());
    if let Some(window) = p.window {
        report = report
            .field("смещение", window.offset)
            .field("длина", window.count);
    }
    Ok(report.field("дайджест", digest.encode(p.encoding)))
}

pub fn verify(ctx: &Context, args: &VerifyArgs) -> Result<Report> {
    let target = &args.target;
    let p = prepare(ctx, target)?;
    let key = p.key.as_deref();
    let expected = p.encoding.decode(&args.expected)?;

    let matches = if target.file {
        let mut progress = ProgressLine::new("Проверка", target.progress && !ctx.json);
        let matches = p.engine.verify_file_with_progress(
            Path::new(&target.input),
            p.window,
            &expected,
            p.algorithm,
            key,
            |event| progress.update(event),
        )?;
        progress.finish();
        matches
    } else {
        match p.window {
            Some(window) => p.engine.verify_bytes_range(
                target.input.as_bytes(),
                window,
                &expected,
                p.algorithm,
                key,
            )?,
            None => p.engine.verify_str(&target.input, &expected, p.algorithm, key)?,
        }
    };

    let report = if matches {
        Report::success("Дайджест совпадает")
    } else {
        Report::failure("Дайджест НЕ совпадает")
    };
    Ok(report.with_encoding(p.encoding).field("алгоритм", p.algorithm))
}
