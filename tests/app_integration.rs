use kursbot::chat::{Bot, ButtonAction, ConversationId, Inbound};
use kursbot::core::cache::RateCache;
use kursbot::core::config::{AppConfig, EXAMPLE_CONFIG};
use kursbot::providers::ExchangeApiSource;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const RATES_PATH: &str = "/v6/latest/RUB";

    pub const RATES_BODY: &str = r#"{
        "result": "success",
        "base_code": "RUB",
        "time_last_update_unix": 1709251200,
        "time_last_update_utc": "Fri, 01 Mar 2024 00:00:01 +0000",
        "rates": {"RUB": 1, "USD": 0.0125, "EUR": 0.01, "CNY": 0.125, "XXX": 0}
    }"#;

    pub async fn create_rates_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RATES_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    /// The bundled example config pointed at a mock server.
    pub fn config_yaml(server_uri: &str) -> String {
        super::EXAMPLE_CONFIG.replace(
            "https://open.er-api.com/v6/latest/RUB",
            &format!("{server_uri}{RATES_PATH}"),
        )
    }
}

fn text(t: &str) -> Inbound {
    Inbound::Text(t.to_string())
}

fn button(action: &str) -> Inbound {
    Inbound::Button(action.to_string())
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_rates_server(200, test_utils::RATES_BODY).await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    fs::write(config_path, test_utils::config_yaml(&mock_server.uri()))
        .expect("Failed to write config file");

    let result = kursbot::run_command(
        kursbot::AppCommand::Ask("30 usd и 40 eur в rub".to_string()),
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );

    let result = kursbot::run_command(
        kursbot::AppCommand::Rates(vec!["usd".to_string(), "юань".to_string()]),
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Rates failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("absent.yaml");

    let result = kursbot::run_command(
        kursbot::AppCommand::Ask("usd".to_string()),
        Some(missing.to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_bot_conversations_against_mock_provider() {
    let mock_server = test_utils::create_rates_server(200, test_utils::RATES_BODY).await;
    let config = AppConfig::from_yaml(&test_utils::config_yaml(&mock_server.uri())).unwrap();
    let bot = kursbot::build_bot(&config).unwrap();
    let chat = ConversationId(1001);

    let reply = bot.handle(chat, text("30 usd и 40 eur в rub")).await;
    info!(reply = %reply.text, "Multi conversion");
    assert!(reply.text.contains("• 30.00 Доллар США = 2400.00 RUB"));
    assert!(reply.text.contains("• 40.00 Евро = 4000.00 RUB"));
    assert!(reply.text.contains("*Итого:* 6400.00 Российский рубль (RUB)"));

    let reply = bot.handle(chat, text("50 евро в рубли")).await;
    assert!(reply.text.contains("*5000.00 Российский рубль (RUB)*"));

    let reply = bot.handle(chat, text("юань")).await;
    assert!(reply.text.contains("Курс к RUB: *8.0000*"));
    assert!(reply.text.contains("2024-03-01 00:00:00"));

    // Guided flow: 10 CNY + 1 USD into EUR
    bot.handle(chat, Inbound::from_line("/convert").unwrap()).await;
    bot.handle(chat, button("conv_from_CNY")).await;
    bot.handle(chat, text("10")).await;
    bot.handle(chat, button(&ButtonAction::ConvertAddMore.to_string())).await;
    bot.handle(chat, button("conv_from_USD")).await;
    bot.handle(chat, text("1")).await;
    bot.handle(chat, button("conv_select_to")).await;
    let summary = bot.handle(chat, button("conv_to_EUR")).await;
    assert!(summary.text.contains("Валюта: EUR"));
    let reply = bot.handle(chat, button("conv_do")).await;
    assert!(reply.text.contains("• 10.00 Китайский юань = 0.80 EUR"), "{}", reply.text);
    assert!(reply.text.contains("• 1.00 Доллар США = 0.80 EUR"));
    assert!(reply.text.contains("*Итого:* 1.60 Евро (EUR)"));

    // One fetch served every conversion above
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_provider_outage_serves_last_table() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(test_utils::RATES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(test_utils::RATES_BODY))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(test_utils::RATES_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = AppConfig::from_yaml(&test_utils::config_yaml(&mock_server.uri())).unwrap();
    let source = ExchangeApiSource::new(&config.provider.url, Duration::from_secs(2)).unwrap();
    let cache = Arc::new(RateCache::with_settings(
        Arc::new(source),
        Duration::from_millis(20),
        Duration::from_secs(2),
    ));
    let bot = Bot::from_config(&config, cache);
    let chat = ConversationId(7);

    let first = bot.handle(chat, text("100 usd rub")).await;
    assert!(first.text.contains("8000.00"));

    tokio::time::sleep(Duration::from_millis(50)).await;

    // Expired, refresh fails, the old table still answers
    let second = bot.handle(chat, text("100 usd rub")).await;
    assert_eq!(second.text, first.text);
    assert!(mock_server.received_requests().await.unwrap().len() >= 2);
}

#[test_log::test(tokio::test)]
async fn test_provider_down_from_the_start() {
    let mock_server =
        test_utils::create_rates_server(200, r#"{"result": "error", "error-type": "quota-reached"}"#)
            .await;
    let config = AppConfig::from_yaml(&test_utils::config_yaml(&mock_server.uri())).unwrap();
    let bot = kursbot::build_bot(&config).unwrap();

    let reply = bot.handle(ConversationId(3), text("100 usd rub")).await;
    assert_eq!(reply.text, "⚠️ Данные недоступны. Попробуйте позже.");

    // Same-currency requests never need the provider
    let reply = bot.handle(ConversationId(3), text("5 usd usd")).await;
    assert_eq!(reply.text, "✅ Валюты совпадают: 5.00 USD");
}
