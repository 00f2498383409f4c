use crate::chat::action::ButtonAction;
use crate::chat::{Button, Keyboard};
use crate::core::currency::{CurrencyCode, CurrencyRegistry};

/// Which side of a conversion a currency list picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    From,
    To,
}

pub fn courses_menu() -> Keyboard {
    vec![
        vec![Button::new("📊 Основные валюты", ButtonAction::MainCourses)],
        vec![Button::new("🔍 Выбрать валюты", ButtonAction::SelectCurrencies)],
    ]
}

pub fn back_to_courses() -> Keyboard {
    vec![vec![Button::new("⬅️ Назад", ButtonAction::BackToCourses)]]
}

pub fn back_to_selection() -> Keyboard {
    vec![vec![Button::new(
        "⬅️ Назад к выбору",
        ButtonAction::SelectCurrencies,
    )]]
}

/// Every configured currency, four per row.
pub fn currency_list(registry: &CurrencyRegistry, side: Side) -> Keyboard {
    let buttons: Vec<Button> = registry
        .iter()
        .map(|info| {
            let action = match side {
                Side::From => ButtonAction::ConvertFrom(info.code),
                Side::To => ButtonAction::ConvertTo(info.code),
            };
            Button::new(format!("{} ({})", info.code, info.name), action)
        })
        .collect();
    buttons.chunks(4).map(<[Button]>::to_vec).collect()
}

/// Toggle buttons, two per row, with the chosen ones ticked.
pub fn currency_selection(registry: &CurrencyRegistry, selected: &[CurrencyCode]) -> Keyboard {
    let buttons: Vec<Button> = registry
        .iter()
        .map(|info| {
            let prefix = if selected.contains(&info.code) { "✅ " } else { "" };
            Button::new(
                format!("{prefix}{} ({})", info.code, info.name),
                ButtonAction::Toggle(info.code),
            )
        })
        .collect();
    let mut rows: Keyboard = buttons.chunks(2).map(<[Button]>::to_vec).collect();
    rows.push(vec![Button::new(
        "📈 Получить курс",
        ButtonAction::GetSelectedCourses,
    )]);
    rows.push(vec![Button::new("⬅️ Назад", ButtonAction::BackToCourses)]);
    rows
}

pub fn after_amount() -> Keyboard {
    vec![
        vec![Button::new("➕ Добавить ещё", ButtonAction::ConvertAddMore)],
        vec![Button::new("➡️ Выбрать 'в'", ButtonAction::ConvertSelectTo)],
    ]
}

pub fn confirm_conversion() -> Keyboard {
    vec![
        vec![Button::new("✅ Конвертировать", ButtonAction::ConvertDo)],
        vec![Button::new("✖️ Отмена", ButtonAction::ConvertCancel)],
    ]
}
