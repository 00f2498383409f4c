use crate::core::currency::CurrencyCode;
use anyhow::anyhow;
use std::fmt::{self, Display};
use std::str::FromStr;

/// Everything an inline-keyboard button can ask for.
///
/// The string form is what travels through the transport as callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    MainCourses,
    SelectCurrencies,
    Toggle(CurrencyCode),
    GetSelectedCourses,
    BackToCourses,
    ConvertFrom(CurrencyCode),
    ConvertTo(CurrencyCode),
    ConvertAddMore,
    ConvertSelectTo,
    ConvertDo,
    ConvertCancel,
}

impl Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonAction::MainCourses => f.write_str("main_courses"),
            ButtonAction::SelectCurrencies => f.write_str("select_currencies"),
            ButtonAction::Toggle(code) => write!(f, "toggle_{code}"),
            ButtonAction::GetSelectedCourses => f.write_str("get_selected_courses"),
            ButtonAction::BackToCourses => f.write_str("back_to_courses"),
            ButtonAction::ConvertFrom(code) => write!(f, "conv_from_{code}"),
            ButtonAction::ConvertTo(code) => write!(f, "conv_to_{code}"),
            ButtonAction::ConvertAddMore => f.write_str("conv_add_more"),
            ButtonAction::ConvertSelectTo => f.write_str("conv_select_to"),
            ButtonAction::ConvertDo => f.write_str("conv_do"),
            ButtonAction::ConvertCancel => f.write_str("conv_cancel"),
        }
    }
}

impl FromStr for ButtonAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let with_code = |rest: &str| -> Result<CurrencyCode, Self::Err> {
            CurrencyCode::new(rest).ok_or_else(|| anyhow!("Invalid currency in button id: {}", s))
        };

        match s {
            "main_courses" => Ok(ButtonAction::MainCourses),
            "select_currencies" => Ok(ButtonAction::SelectCurrencies),
            "get_selected_courses" => Ok(ButtonAction::GetSelectedCourses),
            "back_to_courses" => Ok(ButtonAction::BackToCourses),
            "conv_add_more" => Ok(ButtonAction::ConvertAddMore),
            "conv_select_to" => Ok(ButtonAction::ConvertSelectTo),
            "conv_do" => Ok(ButtonAction::ConvertDo),
            "conv_cancel" => Ok(ButtonAction::ConvertCancel),
            _ => {
                if let Some(rest) = s.strip_prefix("toggle_") {
                    with_code(rest).map(ButtonAction::Toggle)
                } else if let Some(rest) = s.strip_prefix("conv_from_") {
                    with_code(rest).map(ButtonAction::ConvertFrom)
                } else if let Some(rest) = s.strip_prefix("conv_to_") {
                    with_code(rest).map(ButtonAction::ConvertTo)
                } else {
                    Err(anyhow!("Unknown button action: {}", s))
                }
            }
        }
    }
}

impl ButtonAction {
    /// The currency carried by the action, if any.
    pub fn currency(&self) -> Option<CurrencyCode> {
        match self {
            ButtonAction::Toggle(code)
            | ButtonAction::ConvertFrom(code)
            | ButtonAction::ConvertTo(code) => Some(*code),
            _ => None,
        }
    }
}
