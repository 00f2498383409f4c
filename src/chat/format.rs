//! User-facing message texts (Telegram-flavoured Markdown).

use crate::chat::session::ConvertDraft;
use crate::core::currency::{CurrencyCode, CurrencyRegistry};
use crate::core::engine::ConversionResult;
use crate::core::rates::RateTable;

pub const RATES_UNAVAILABLE: &str = "⚠️ Данные недоступны. Попробуйте позже.";
pub const CONVERSION_FAILED: &str = "⚠️ Ошибка конвертации. Попробуйте позже.";
pub const NON_POSITIVE_AMOUNT: &str = "❌ Сумма должна быть положительной.";
pub const ENTER_POSITIVE_NUMBER: &str = "❌ Введите положительное число:";
pub const UNKNOWN_ACTION: &str = "Неизвестное действие.";
pub const STALE_BUTTON: &str = "⚠️ Эта кнопка сейчас недоступна. Начните заново: /convert";
pub const UNKNOWN_COMMAND: &str = "Неизвестная команда. Список команд: /help";
pub const COURSES_MENU: &str = "Выберите, какие курсы показать:";
pub const NOTHING_SELECTED: &str = "❌ Вы не выбрали ни одной валюты!";
pub const NO_RATES_FOR_SELECTION: &str = "❌ Не удалось получить курсы для указанных валют.";
pub const CONVERT_PICK_FROM: &str = "💱 Выберите валюту, *из* которой конвертировать:";
pub const CONVERT_PICK_MORE: &str = "➕ Выберите ещё одну валюту *из* которой конвертировать:";
pub const CONVERT_PICK_TO: &str = "➡️ Выберите валюту, *в* которую конвертировать:";
pub const CONVERT_NEED_FROM: &str = "❌ Сначала выберите хотя бы одну валюту 'из'.";
pub const CONVERT_NOT_ENOUGH_DATA: &str = "❌ Недостаточно данных.";
pub const CONVERT_MISSING_AMOUNTS: &str = "❌ Введите все суммы!";
pub const CONVERT_CANCELLED: &str = "❎ Конвертация отменена.";

pub const USAGE_EXAMPLES: &str = "🔄 Примеры:\n\
    • 100 usd rub\n\
    • 50 евро в рубли\n\
    • 30 usd и 20 eur в rub\n\
    • usd → курс доллара";

pub fn start_text() -> String {
    "Привет! 👋\n\n\
     🤖 *Я бот для отслеживания курсов валют*\n\n\
     📊 *Доступные команды:*\n\
     • /start - Начальное сообщение\n\
     • /courses - Курсы основных валют\n\
     • /convert - Конвертер валют\n\
     • /help - Помощь и инструкции\n\n\
     💡 *Примеры использования:*\n\
     `/courses USD` - курс доллара\n\
     `/convert 100 USD RUB` - конвертация\n\
     `30 USD и 40 EUR в RUB` - множественная конвертация\n\n\
     🔍 *Подсказка:* Можно вводить частичные названия валют.\n\
     Например: 'руб', 'дол', 'евр'"
        .to_string()
}

pub fn help_text(registry: &CurrencyRegistry) -> String {
    let mut text = String::from(
        "📖 *Справочная информация*\n\n\
         🔹 *Основные команды:*\n\
         • `/courses` - курсы основных или выбранных валют\n\
         • `/courses [код]` - курс конкретной валюты\n\
         • `/convert [сумма] [из] [в]` - конвертация\n\
         • `/cancel` - отменить пошаговую конвертацию\n\n\
         🔹 *Примеры запросов:*\n\
         `/courses EUR`\n\
         `/convert 150 USD RUB`\n\
         `50 EUR и 100 USD в RUB`\n\n\
         🔹 *Поддерживаемые валюты:*\n",
    );

    let codes: Vec<&str> = registry.iter().map(|c| c.code.as_str()).collect();
    for chunk in codes.chunks(5) {
        text.push_str(&chunk.join(" | "));
        text.push('\n');
    }

    text.push_str(
        "\n🔹 *Быстрая конвертация:*\n\
         Просто отправьте сообщение вида:\n\
         `100 USD в RUB` или `30 EUR и 50 USD в RUB`",
    );
    text
}

pub fn unknown_currency(token: &str) -> String {
    format!("❌ Валюта '{token}' не найдена. Попробуйте USD, EUR")
}

pub fn missing_rate(code: &CurrencyCode) -> String {
    format!("⚠️ Ошибка для {code}")
}

pub fn same_currency(amount: f64, code: &CurrencyCode) -> String {
    format!("✅ Валюты совпадают: {amount:.2} {code}")
}

/// Card for a single currency. The table must contain `code`.
pub fn rate_message(registry: &CurrencyRegistry, table: &RateTable, code: &CurrencyCode) -> String {
    let name = registry.display_name(code);
    if *code == CurrencyCode::RUB {
        return format!("• {name} ({code})\n  1 RUB = 1 RUB");
    }
    let Some(rate) = table.get(code) else {
        return NO_RATES_FOR_SELECTION.to_string();
    };
    format!(
        "💱 *{name} ({code})*\n\
         • Курс к RUB: *{rate:.4}*\n\
         • Время обновления: {}\n\
         \n📊 1 RUB = {:.4} {code}",
        table.update_label(),
        1.0 / rate
    )
}

/// Rates for several currencies; codes missing from the table are skipped.
pub fn multiple_rates(
    registry: &CurrencyRegistry,
    table: &RateTable,
    codes: &[CurrencyCode],
) -> String {
    let rows: Vec<String> = codes
        .iter()
        .filter_map(|code| table.get(code).map(|rate| (code, rate)))
        .map(|(code, rate)| {
            format!(
                "• {} ({code}): *{rate:.4}*\n  1 {code} = {rate:.2} RUB\n  1 RUB = {:.4} {code}\n",
                registry.display_name(code),
                1.0 / rate
            )
        })
        .collect();

    if rows.is_empty() {
        return "Нет данных о курсах валют".to_string();
    }
    format!("📈 *Курсы валют к RUB:*\n\n{}", rows.join("\n"))
}

pub fn conversion_result(registry: &CurrencyRegistry, result: &ConversionResult) -> String {
    match result {
        ConversionResult::Simple {
            amount,
            from,
            to,
            converted,
            rate,
        } => format!(
            "💱 *Результат:*\n\
             • {amount:.2} {} ({from}) =\n\
             • *{converted:.2} {} ({to})*\n\n\
             📊 Курс: 1 {from} = {rate:.4} {to}",
            registry.display_name(from),
            registry.display_name(to),
        ),
        ConversionResult::Multi { items, to, total } => {
            let details: Vec<String> = items
                .iter()
                .map(|item| {
                    format!(
                        "• {:.2} {} = {:.2} {to}",
                        item.amount,
                        registry.display_name(&item.from),
                        item.converted
                    )
                })
                .collect();
            format!(
                "💱 *Множественная конвертация:*\n\n{}\n\n📊 *Итого:* {total:.2} {} ({to})",
                details.join("\n"),
                registry.display_name(to),
            )
        }
    }
}

pub fn amount_saved(amount: f64) -> String {
    format!("Сумма {amount} сохранена.\nЧто дальше?")
}

pub fn enter_amount(code: &CurrencyCode) -> String {
    format!("Введите сумму в {code}:")
}

pub fn selection_prompt(selected: usize) -> String {
    format!("Выберите валюты для отображения (выбрано: {selected}):")
}

pub fn draft_summary(draft: &ConvertDraft, to: &CurrencyCode) -> String {
    let lines: Vec<String> = draft
        .items
        .iter()
        .map(|item| match item.amount {
            Some(amount) => format!("• {}: {amount}", item.from),
            None => format!("• {}: ?", item.from),
        })
        .collect();
    format!(
        "✅ Выбрано:\n{}\n\nВалюта: {to}\n\nНажмите 'Конвертировать'.",
        lines.join("\n")
    )
}
