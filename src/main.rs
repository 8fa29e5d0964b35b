use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use secure_crypt::cli::{derive, file, hash, seal, Context, Report};
use secure_crypt::config::Settings;

#[derive(Parser)]
#[command(name = "secure-crypt")]
#[command(author = "Oleg")]
#[command(version = "0.1.0")]
#[command(about = "Симметричное шифрование, хеширование и получение ключей", long_about = None)]
struct Cli {
    /// Файл настроек (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Вывод результата в JSON
    #[arg(long, global = true)]
    json: bool,

    /// Подробный журнал в stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Вычислить хеш или HMAC строки либо файла
    Hash(hash::HashArgs),

    /// Сравнить хеш или HMAC с ожидаемым значением
    Verify(hash::VerifyArgs),

    /// Получить ключ из пароля (PBKDF2)
    Derive(derive::DeriveArgs),

    /// Запечатать файл паролем
    Seal(seal::SealArgs),

    /// Открыть запечатанный файл
    Open(seal::OpenArgs),

    /// Зашифровать файл ключом (AES-CBC + HMAC)
    EncryptFile(file::FileArgs),

    /// Расшифровать файл ключом (AES-CBC + HMAC)
    DecryptFile(file::FileArgs),

    /// Сгенерировать случайный ключ
    Keygen(file::KeygenArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "secure_crypt=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    match run(cli) {
        Ok(report) => {
            report.print(json);
            if report.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            if json {
                Report::failure(format!("{:#}", e)).print(true);
            } else {
                eprintln!("{} {:#}", "Ошибка:".red().bold(), e);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<Report> {
    let settings = Settings::load(cli.config.as_deref()).context("Не удалось загрузить настройки")?;
    let ctx = Context::new(settings, cli.json);

    let report = match &cli.command {
        Commands::Hash(args) => hash::run(&ctx, args),
        Commands::Verify(args) => hash::verify(&ctx, args),
        Commands::Derive(args) => derive::run(&ctx, args),
        Commands::Seal(args) => seal::seal(&ctx, args),
        Commands::Open(args) => seal::open(&ctx, args),
        Commands::EncryptFile(args) => file::encrypt(&ctx, args),
        Commands::DecryptFile(args) => file::decrypt(&ctx, args),
        Commands::Keygen(args) => file::keygen(&ctx, args),
    }?;

    Ok(report)
}
