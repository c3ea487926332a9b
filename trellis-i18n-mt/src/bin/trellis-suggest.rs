use clap::{Arg, Command};
use std::env;
use std::sync::Arc;
use trellis_i18n::{ValidationOutcome, validate};
use trellis_i18n_mt::{
    MachineTranslator, MockMode, MockTranslator, ProviderConfig, SuggestionClient,
    SuggestionRequest, SuggestionResult,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("trellis-suggest")
        .version("0.1.0")
        .about("Fetch a machine translation suggestion for one source string")
        .arg(
            Arg::new("message")
                .help("Source string, as shown in the editing grid")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("target-locale")
                .help("Target language code (e.g., fr, es, pt-BR)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("source-locale")
                .long("source")
                .short('s')
                .help("Source language code (default: en)")
                .default_value("en"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use the mock translator instead of the configured provider")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log requests and show placeholder validation")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let Some(source_message) = matches.get_one::<String>("message") else {
        return Err("missing source message".into());
    };
    let Some(target_locale) = matches.get_one::<String>("target-locale") else {
        return Err("missing target locale".into());
    };
    let source_locale = matches
        .get_one::<String>("source-locale")
        .map(String::as_str)
        .unwrap_or("en");
    let use_mock = matches.get_flag("mock");
    let verbose = matches.get_flag("verbose");

    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "trellis_i18n_mt=debug".into()),
            )
            .with_writer(std::io::stderr)
            .init();

        println!("📝 Source: \"{}\"", source_message);
        println!("🌍 {} → {}", source_locale, target_locale);
    }

    let provider: Arc<dyn MachineTranslator> = if use_mock {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else {
        let config = match ProviderConfig::from_lookup(|key| env::var(key).ok()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ {}", e);
                eprintln!("   Set one of AZURE_CLIENT_SECRET,");
                eprintln!("   GOOGLE_APPLICATION_CREDENTIALS_PATH (+ GOOGLE_PROJECT_ID),");
                eprintln!("   DEEPL_AUTH_KEY, YANDEX_TRANSLATE_KEY, GOOGLE_AJAX_API_KEY");
                eprintln!("   or TRELLIS_PROXY_URL, or use --mock");
                return Err(e.into());
            }
        };
        config.build()?
    };

    let mut client = SuggestionClient::new(provider);
    if let Ok(secs) = env::var("TRELLIS_SUGGESTION_TIMEOUT_SECS") {
        client = client.with_timeout(std::time::Duration::from_secs(secs.trim().parse()?));
    }
    if verbose {
        println!("🔌 Provider: {}", client.provider_name());
        println!();
    }

    let request = SuggestionRequest::new(source_message, source_locale, target_locale);
    let suggestion = match client.suggest(&request).await {
        SuggestionResult::Success(text) => text,
        SuggestionResult::Failure(message) => {
            eprintln!("❌ {}", message);
            return Err(message.into());
        }
    };

    println!("{}", suggestion);

    if verbose {
        match validate(source_message, &suggestion) {
            ValidationOutcome::Valid => println!("✅ Placeholders match"),
            ValidationOutcome::Invalid(reason) => {
                println!("⚠️  Unmatched variables ({})", reason.as_str())
            }
        }
    }

    Ok(())
}
