//! S/MIME signer CLI.
//!
//! Command-line interface for signing message text into S/MIME parts and
//! verifying signed mail bodies, with configuration support and certificate
//! inspection.

use clap::{Parser, Subcommand, ValueEnum};
use miette::{miette, IntoDiagnostic, Result};
use std::io::Read;
use std::path::PathBuf;

use smime_signer::domain::pem;
use smime_signer::infra::config::{ConfigManager, SmimeConfiguration};
use smime_signer::services::body_scrubber;
use smime_signer::services::mime_envelope;
use smime_signer::services::signed_data_parser;
use smime_signer::services::CertificateValidator;
use smime_signer::{
    smime_sign, smime_verify, HashAlgorithm, MimeHeaders, SigningConfig, SmimeError,
};

#[derive(Parser)]
#[command(name = "smime-signer")]
#[command(about = "S/MIME message signing and verification with CMS (PKCS#7)")]
#[command(long_about = "
S/MIME Signer - sign message text and verify signed mail bodies

EXAMPLES:
    # Sign a message body
    smime-signer sign body.txt --key key.pem --cert cert.pem -o signed.txt

    # Sign for an HTML-bodied transport (wraps output in <pre> markers)
    smime-signer sign body.txt --key key.pem --cert cert.pem --html

    # Verify a received body against the sender's certificate
    smime-signer verify received.txt --cert sender-cert.pem

    # Inspect the CMS structure of a signed message
    smime-signer inspect signed.txt

    # Analyze a certificate for S/MIME suitability
    smime-signer analyze-cert cert.pem

ENVIRONMENT VARIABLES:
    RUST_LOG        Logging level (debug, info, warn, error)
")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign message text into an S/MIME part
    Sign {
        /// Text file to sign ("-" for stdin)
        #[arg(value_name = "INPUT_FILE")]
        input: PathBuf,

        /// PEM file with the PKCS#8 private key
        #[arg(short, long, value_name = "KEY_PEM")]
        key: PathBuf,

        /// PEM file with the signer certificate
        #[arg(short, long, value_name = "CERT_PEM")]
        cert: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT_FILE")]
        output: Option<PathBuf>,

        /// Hash algorithm to use
        #[arg(long, value_enum)]
        hash: Option<HashAlgorithmArg>,

        /// Wrap the output in <pre> markers for an HTML body
        #[arg(long)]
        html: bool,

        /// From header (overrides config)
        #[arg(long)]
        from: Option<String>,

        /// To header (overrides config)
        #[arg(long)]
        to: Option<String>,

        /// Subject header (overrides config)
        #[arg(long)]
        subject: Option<String>,
    },

    /// Verify a signed mail body against the expected signer certificate
    Verify {
        /// File with the received body text ("-" for stdin)
        #[arg(value_name = "INPUT_FILE")]
        input: PathBuf,

        /// PEM file with the expected signer certificate
        #[arg(short, long, value_name = "CERT_PEM")]
        cert: PathBuf,
    },

    /// Show the CMS structure of a signed message
    Inspect {
        /// File with the signed body text ("-" for stdin)
        #[arg(value_name = "INPUT_FILE")]
        input: PathBuf,
    },

    /// Analyze a certificate for S/MIME signing suitability
    AnalyzeCert {
        /// PEM file with the certificate
        #[arg(value_name = "CERT_PEM")]
        cert: PathBuf,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Create the configuration file with defaults
    Init,
    /// Show the active configuration
    Show,
    /// Print the configuration file path
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum HashAlgorithmArg {
    Sha256,
    Sha384,
    Sha512,
}

impl From<HashAlgorithmArg> for HashAlgorithm {
    fn from(arg: HashAlgorithmArg) -> Self {
        match arg {
            HashAlgorithmArg::Sha256 => HashAlgorithm::Sha256,
            HashAlgorithmArg::Sha384 => HashAlgorithm::Sha384,
            HashAlgorithmArg::Sha512 => HashAlgorithm::Sha512,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sign {
            input,
            key,
            cert,
            output,
            hash,
            html,
            from,
            to,
            subject,
        } => run_sign(input, key, cert, output, hash, html, from, to, subject),
        Commands::Verify { input, cert } => run_verify(input, cert),
        Commands::Inspect { input } => run_inspect(input),
        Commands::AnalyzeCert { cert } => run_analyze_cert(cert),
        Commands::Config(command) => run_config(command),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_sign(
    input: PathBuf,
    key: PathBuf,
    cert: PathBuf,
    output: Option<PathBuf>,
    hash: Option<HashAlgorithmArg>,
    html: bool,
    from: Option<String>,
    to: Option<String>,
    subject: Option<String>,
) -> Result<()> {
    let configuration = load_configuration();
    let text = read_input(&input)?;
    let key_pem = std::fs::read_to_string(&key).into_diagnostic()?;
    let cert_pem = std::fs::read_to_string(&cert).into_diagnostic()?;

    if !pem::is_pem(&key_pem) {
        return Err(miette!("{} does not look like a PEM file", key.display()));
    }
    if !pem::is_pem(&cert_pem) {
        return Err(miette!("{} does not look like a PEM file", cert.display()));
    }

    let hash_algorithm = match hash {
        Some(arg) => arg.into(),
        None => configuration.hash_algorithm().into_diagnostic()?,
    };
    let defaults = configuration.headers();
    let config = SigningConfig {
        hash_algorithm,
        headers: MimeHeaders {
            from: from.unwrap_or(defaults.from),
            to: to.unwrap_or(defaults.to),
            subject: subject.unwrap_or(defaults.subject),
        },
        wrap_html: html || configuration.wrap_html_body,
        ..SigningConfig::default()
    };

    let signed = smime_sign(&text, &key_pem, &cert_pem, &config).into_diagnostic()?;

    match output {
        Some(path) => {
            std::fs::write(&path, &signed).into_diagnostic()?;
            println!("✅ Signed message written to {}", path.display());
        }
        None => print!("{signed}"),
    }
    Ok(())
}

fn run_verify(input: PathBuf, cert: PathBuf) -> Result<()> {
    let body = read_input(&input)?;
    let cert_pem = std::fs::read_to_string(&cert).into_diagnostic()?;

    match smime_verify(&body, &cert_pem) {
        Ok(report) if report.signature_verified => {
            println!("✅ Signature verified.");
            if let Some(signer) = report.signer_certificate {
                println!("   Signer serial: {}", signer.serial_hex());
                println!("   Valid until:   {}", signer.not_after());
            }
            Ok(())
        }
        Ok(_) => {
            // Definite negative: the message parsed but the signature does
            // not match the expected certificate.
            println!("❌ Signature invalid.");
            std::process::exit(1);
        }
        Err(err @ (SmimeError::ParseError(_) | SmimeError::FormatError(_))) => {
            println!("⚠️  Could not verify — is this an S/MIME message?");
            Err(err).into_diagnostic()
        }
        Err(other) => Err(other).into_diagnostic(),
    }
}

fn run_inspect(input: PathBuf) -> Result<()> {
    let body = read_input(&input)?;
    let section = body_scrubber::recover_smime_text(&body).into_diagnostic()?;
    let cms_der = mime_envelope::unwrap_signed_data(&section).into_diagnostic()?;
    let parsed = signed_data_parser::parse_content_info(&cms_der).into_diagnostic()?;

    println!("CMS SignedData ({} bytes)", cms_der.len());
    println!("  Content:      {} bytes", parsed.econtent.len());
    if let Ok(text) = std::str::from_utf8(&parsed.econtent) {
        let preview: String = text.chars().take(60).collect();
        println!("  Preview:      {preview:?}");
    }
    println!("  Certificates: {}", parsed.certificates.len());
    for cert in &parsed.certificates {
        println!("    - serial {} (valid until {})", cert.serial_hex(), cert.not_after());
    }
    println!("  Signers:      {}", parsed.signers.len());
    for signer in &parsed.signers {
        println!(
            "    - digest {} / signature {}",
            signer.digest_algorithm.as_str(),
            signer.signature_algorithm_oid
        );
    }
    Ok(())
}

fn run_analyze_cert(cert: PathBuf) -> Result<()> {
    let cert_pem = std::fs::read_to_string(&cert).into_diagnostic()?;
    let blocks = pem::decode(&cert_pem).into_diagnostic()?;
    let der = blocks
        .first()
        .ok_or_else(|| miette!("{} contains no PEM block", cert.display()))?;
    let analysis = CertificateValidator::validate_for_email_signing(der).into_diagnostic()?;

    println!("Subject: {}", analysis.subject);
    println!("Issuer:  {}", analysis.issuer);
    println!("Serial:  {}", analysis.serial_number);
    println!("Expires in {} days", analysis.days_until_expiry);
    if analysis.is_email_signing_suitable {
        println!("✅ Suitable for S/MIME signing");
    } else {
        println!("❌ Not suitable for S/MIME signing");
    }
    for warning in &analysis.warnings {
        println!("  ⚠ {warning}");
    }
    Ok(())
}

fn run_config(command: ConfigCommands) -> Result<()> {
    let manager = ConfigManager::new();
    match command {
        ConfigCommands::Init => {
            let config = SmimeConfiguration::default();
            manager.save(&config).into_diagnostic()?;
            println!("✅ Configuration initialized: {}", manager.config_path().display());
        }
        ConfigCommands::Show => {
            let config = manager.load_or_create_default().into_diagnostic()?;
            let rendered = toml::to_string_pretty(&config).into_diagnostic()?;
            print!("{rendered}");
        }
        ConfigCommands::Path => {
            println!("{}", manager.config_path().display());
        }
    }
    Ok(())
}

/// Load the configuration without creating the file as a side effect.
fn load_configuration() -> SmimeConfiguration {
    let manager = ConfigManager::new();
    if manager.config_path().exists() {
        manager.load().unwrap_or_else(|e| {
            log::warn!("falling back to default configuration: {e}");
            SmimeConfiguration::default()
        })
    } else {
        SmimeConfiguration::default()
    }
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .into_diagnostic()?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).into_diagnostic()
    }
}
