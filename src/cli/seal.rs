//! Запечатывание файлов паролем (PBKDF2 + AES-GCM)

use std::path::PathBuf;

use clap::Args;
use secrecy::ExposeSecret;

use crate::crypto::{AeadAlgorithm, Prf};
use crate::envelope::{self, EnvelopeParams};
use crate::error::Result;

use super::{prompt_new_password, prompt_password, Context, Report};

#[derive(Debug, Clone, Args)]
pub struct SealArgs {
    /// Исходный файл
    pub input: PathBuf,

    /// Куда записать конверт
    pub output: PathBuf,

    /// AEAD: aes-128-gcm, aes-192-gcm, aes-256-gcm
    #[arg(short, long)]
    pub aead: Option<AeadAlgorithm>,

    #[arg(short, long)]
    pub prf: Option<Prf>,

    #[arg(short, long)]
    pub iterations: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub struct OpenArgs {
    /// Файл конверта
    pub input: PathBuf,

    /// Куда записать открытый текст
    pub output: PathBuf,
}

pub fn seal(ctx: &Context, args: &SealArgs) -> Result<Report> {
    let password = prompt_new_password()?;
    seal_with(ctx, args, password.expose_secret())
}

pub fn open(_ctx: &Context, args: &OpenArgs) -> Result<Report> {
    let password = prompt_password()?;
    open_with(args, password.expose_secret())
}

fn params_for(ctx: &Context, args: &SealArgs) -> EnvelopeParams {
    let mut params = EnvelopeParams::from(&ctx.settings);
    if let Some(aead) = args.aead {
        params.aead = aead;
    }
    if let Some(prf) = args.prf {
        if prf != params.prf {
            params.prf = prf;
            params.iterations = prf.default_iterations();
        }
    }
    if let Some(iterations) = args.iterations {
        params.iterations = iterations;
    }
    params
}

fn seal_with(ctx: &Context, args: &SealArgs, password: &str) -> Result<Report> {
    let params = params_for(ctx, args);
    envelope::seal_file(password, &args.input, &args.output, &params)?;

    Ok(Report::success("Файл запечатан")
        .field("aead", params.aead)
        .field("prf", params.prf)
        .field("итерации", params.iterations)
        .field("файл", args.output.display()))
}

fn open_with(args: &OpenArgs, password: &str) -> Result<Report> {
    envelope::open_file(password, &args.input, &args.output)?;
    Ok(Report::success("Файл открыт").field("файл", args.output.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::crypto::policy::MIN_ITERATIONS_SHA512;
    use crate::error::CryptoError;
    use std::fs;

    fn ctx() -> Context {
        Context::new(Settings::default(), true)
    }

    fn seal_args(dir: &std::path::Path) -> SealArgs {
        SealArgs {
            input: dir.join("plain.txt"),
            output: dir.join("sealed.bin"),
            aead: Some(AeadAlgorithm::Aes128Gcm),
            prf: Some(Prf::HmacSha512),
            iterations: None,
        }
    }

    #[test]
    fn test_prf_override_resets_iterations() {
        let dir = tempfile::tempdir().unwrap();
        let params = params_for(&ctx(), &seal_args(dir.path()));
        assert_eq!(params.prf, Prf::HmacSha512);
        assert_eq!(params.iterations, MIN_ITERATIONS_SHA512);
        assert_eq!(params.aead, AeadAlgorithm::Aes128Gcm);
    }

    #[test]
    fn test_seal_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let args = seal_args(dir.path());
        fs::write(&args.input, b"secret notes").unwrap();

        assert!(seal_with(&ctx(), &args, "long enough password").unwrap().success);

        let open_args = OpenArgs {
            input: args.output.clone(),
            output: dir.path().join("opened.txt"),
        };
        open_with(&open_args, "long enough password").unwrap();
        assert_eq!(fs::read(&open_args.output).unwrap(), b"secret notes");

        let wrong = OpenArgs {
            input: args.output.clone(),
            output: dir.path().join("wrong.txt"),
        };
        assert!(matches!(
            open_with(&wrong, "not the password"),
            Err(CryptoError::AuthenticationFailed)
        ));
        assert!(!wrong.output.exists());
    }
}
