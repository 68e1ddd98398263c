use vidpace_mailer::client::{FormClient, FormField, JsonFileStore, StatusKind};

// Environment variable feeding each form field
const FIELD_VARS: [(FormField, &str); 7] = [
    (FormField::SenderEmail, "SENDER_EMAIL"),
    (FormField::SenderPassword, "SENDER_PASSWORD"),
    (FormField::RecipientEmail, "RECIPIENT_EMAIL"),
    (FormField::RecipientName, "RECIPIENT_NAME"),
    (FormField::EmailSubject, "EMAIL_SUBJECT"),
    (FormField::MessageBody, "MESSAGE_BODY"),
    (FormField::SenderName, "SENDER_NAME"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let base_url =
        std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    let state_path =
        std::env::var("FORM_STATE").unwrap_or_else(|_| ".form-client.json".to_string());
    let command = std::env::args().nth(1).unwrap_or_else(|| "preview".to_string());

    let mut client = FormClient::new(base_url.clone(), JsonFileStore::new(&state_path));
    client.load_saved()?;
    println!("Loaded saved form data from {state_path}");

    for (field, var) in FIELD_VARS {
        if let Ok(value) = std::env::var(var) {
            client.set_field(field, value)?;
        }
    }

    let outcome = match command.as_str() {
        "preview" => client.preview().await,
        "send" => client.send().await,
        "clear" => client.clear_saved_data(),
        other => {
            eprintln!("Unknown command '{other}'. Expected one of: preview, send, clear");
            std::process::exit(2);
        }
    };

    if let Some(status) = client.status() {
        let label = match status.kind {
            StatusKind::Info => "info",
            StatusKind::Success => "success",
            StatusKind::Error => "error",
        };
        println!("[{label}] {}", status.message);
    }

    if let Some(html) = client.preview_html() {
        println!("\n{html}");
    }

    outcome.map_err(Into::into)
}
