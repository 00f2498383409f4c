use crate::chat::action::ButtonAction;
use crate::chat::format;
use crate::chat::keyboard::{self, Side};
use crate::chat::session::{ConversationId, ConvertDraft, DraftStage, Session, SessionStore};
use crate::chat::{Inbound, Reply};
use crate::core::cache::RateCache;
use crate::core::config::AppConfig;
use crate::core::currency::{CurrencyCode, CurrencyRegistry};
use crate::core::engine::{self, ConversionError, ConversionRequest};
use crate::core::query::{self, ParseError, ParsedQuery, QueryParser};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Answers one inbound event at a time, per conversation.
pub struct Bot {
    registry: CurrencyRegistry,
    separators: Vec<String>,
    rates: Arc<RateCache>,
    sessions: SessionStore,
}

impl Bot {
    pub fn new(registry: CurrencyRegistry, separators: Vec<String>, rates: Arc<RateCache>) -> Self {
        Bot {
            registry,
            separators,
            rates,
            sessions: SessionStore::new(),
        }
    }

    pub fn from_config(config: &AppConfig, rates: Arc<RateCache>) -> Self {
        Self::new(config.registry(), config.separators.clone(), rates)
    }

    pub fn parser(&self) -> QueryParser<'_> {
        QueryParser::new(&self.registry, &self.separators)
    }

    #[instrument(name = "BotTurn", skip_all, fields(conversation = %conversation))]
    pub async fn handle(&self, conversation: ConversationId, inbound: Inbound) -> Reply {
        match inbound {
            Inbound::Command { name, args } => self.handle_command(conversation, &name, &args).await,
            Inbound::Text(text) => self.handle_text(conversation, &text).await,
            Inbound::Button(id) => match id.parse::<ButtonAction>() {
                Ok(action)
                    if action
                        .currency()
                        .is_none_or(|code| self.registry.contains(&code)) =>
                {
                    self.handle_button(conversation, action).await
                }
                Ok(action) => {
                    debug!(%action, "Button refers to an unsupported currency");
                    Reply::text(format::UNKNOWN_ACTION)
                }
                Err(e) => {
                    debug!(error = %e, "Ignoring unknown button");
                    Reply::text(format::UNKNOWN_ACTION)
                }
            },
        }
    }

    async fn handle_command(&self, conversation: ConversationId, name: &str, args: &[String]) -> Reply {
        debug!(command = name, args = args.len(), "Handling command");
        match name {
            "start" => Reply::text(format::start_text()),
            "help" => Reply::text(format::help_text(&self.registry)),
            "courses" | "rates" if args.is_empty() => {
                Reply::text(format::COURSES_MENU).with_keyboard(keyboard::courses_menu())
            }
            "courses" | "rates" => self.show_rates_for(args).await,
            "convert" if args.is_empty() => self.begin_conversion(conversation).await,
            "convert" => self.answer_query(&args.join(" ")).await,
            "cancel" => {
                self.sessions
                    .with_session(conversation, |s| s.draft = None)
                    .await;
                Reply::text(format::CONVERT_CANCELLED)
            }
            _ => Reply::text(format::UNKNOWN_COMMAND),
        }
    }

    async fn handle_text(&self, conversation: ConversationId, text: &str) -> Reply {
        let text = text.trim();

        let awaiting_amount = self
            .sessions
            .peek(conversation, |s| s.is_some_and(Session::is_awaiting_amount))
            .await;
        if awaiting_amount {
            return self.accept_amount(conversation, text).await;
        }

        if text.trim_matches(|c: char| c == ' ' || c == '/').eq_ignore_ascii_case("start") {
            return Reply::text(format::start_text());
        }

        self.answer_query(text).await
    }

    async fn answer_query(&self, text: &str) -> Reply {
        match self.parser().parse(text) {
            Ok(ParsedQuery::RateOnly(code)) => self.show_rates(&[code]).await,
            Ok(ParsedQuery::Convert(request)) => self.execute(&request).await,
            Err(ParseError::UnknownCurrency(token)) => Reply::text(format!(
                "{}\n\n{}",
                format::unknown_currency(&token),
                format::USAGE_EXAMPLES
            )),
            Err(ParseError::NonPositiveAmount(_)) => Reply::text(format::NON_POSITIVE_AMOUNT),
            Err(e) => {
                debug!(error = %e, "Could not parse query");
                Reply::text(format::USAGE_EXAMPLES)
            }
        }
    }

    async fn show_rates_for(&self, args: &[String]) -> Reply {
        let mut codes = Vec::new();
        for arg in args {
            match self.registry.resolve(arg) {
                Some(code) if !codes.contains(&code) => codes.push(code),
                Some(_) => {}
                None => return Reply::text(format::unknown_currency(arg)),
            }
        }
        self.show_rates(&codes).await
    }

    async fn show_rates(&self, codes: &[CurrencyCode]) -> Reply {
        let Ok(table) = self.rates.get_rates().await else {
            return Reply::text(format::RATES_UNAVAILABLE);
        };
        let available: Vec<CurrencyCode> =
            codes.iter().copied().filter(|c| table.contains(c)).collect();
        match available.as_slice() {
            [] => Reply::text(format::NO_RATES_FOR_SELECTION),
            [code] => Reply::text(format::rate_message(&self.registry, &table, code)),
            _ => Reply::text(format::multiple_rates(&self.registry, &table, &available)),
        }
    }

    /// Converts a validated request against one rate snapshot.
    pub async fn execute(&self, request: &ConversionRequest) -> Reply {
        if let ConversionRequest::Simple { amount, from, to } = request {
            if from == to {
                return Reply::text(format::same_currency(*amount, from));
            }
        }

        let Ok(table) = self.rates.get_rates().await else {
            return Reply::text(format::RATES_UNAVAILABLE);
        };

        match engine::convert_request(request, &table) {
            Ok(result) => Reply::text(format::conversion_result(&self.registry, &result)),
            Err(ConversionError::MissingRate(code)) => {
                warn!(%code, "Rate missing from table");
                match request {
                    ConversionRequest::Simple { .. } => Reply::text(format::CONVERSION_FAILED),
                    ConversionRequest::Multi { .. } => Reply::text(format::missing_rate(&code)),
                }
            }
            Err(ConversionError::NonPositiveAmount(amount)) => {
                debug!(amount, "Refusing to convert");
                Reply::text(format::NON_POSITIVE_AMOUNT)
            }
        }
    }

    async fn begin_conversion(&self, conversation: ConversationId) -> Reply {
        self.sessions
            .with_session(conversation, |s| s.draft = Some(ConvertDraft::default()))
            .await;
        info!(%conversation, "Started guided conversion");
        Reply::text(format::CONVERT_PICK_FROM)
            .with_keyboard(keyboard::currency_list(&self.registry, Side::From))
    }

    async fn accept_amount(&self, conversation: ConversationId, text: &str) -> Reply {
        let Ok(amount) = query::parse_amount(text) else {
            return Reply::text(format::ENTER_POSITIVE_NUMBER);
        };
        let saved = self
            .sessions
            .with_session(conversation, |s| {
                s.draft
                    .as_mut()
                    .is_some_and(|draft| draft.set_pending_amount(amount))
            })
            .await;
        if !saved {
            return Reply::text(format::STALE_BUTTON);
        }
        Reply::text(format::amount_saved(amount)).with_keyboard(keyboard::after_amount())
    }

    async fn handle_button(&self, conversation: ConversationId, action: ButtonAction) -> Reply {
        debug!(%action, "Handling button");
        match action {
            ButtonAction::MainCourses => {
                let mut reply = self.show_rates(self.registry.main_currencies()).await;
                reply.keyboard = keyboard::back_to_courses();
                reply
            }
            ButtonAction::SelectCurrencies => {
                self.sessions
                    .with_session(conversation, |s| s.selected.clear())
                    .await;
                self.selection_reply(&[])
            }
            ButtonAction::Toggle(code) => {
                let selected = self
                    .sessions
                    .with_session(conversation, |s| {
                        s.toggle(code);
                        s.selected.clone()
                    })
                    .await;
                self.selection_reply(&selected)
            }
            ButtonAction::GetSelectedCourses => {
                let selected = self
                    .sessions
                    .peek(conversation, |s| s.map(|s| s.selected.clone()).unwrap_or_default())
                    .await;
                if selected.is_empty() {
                    return Reply::text(format::NOTHING_SELECTED)
                        .with_keyboard(keyboard::currency_selection(&self.registry, &[]));
                }
                // Display order, not click order
                let ordered: Vec<CurrencyCode> = self
                    .registry
                    .codes()
                    .filter(|c| selected.contains(c))
                    .collect();
                let mut reply = self.show_rates(&ordered).await;
                reply.keyboard = keyboard::back_to_selection();
                reply
            }
            ButtonAction::BackToCourses => {
                Reply::text(format::COURSES_MENU).with_keyboard(keyboard::courses_menu())
            }
            ButtonAction::ConvertCancel => {
                self.sessions
                    .with_session(conversation, |s| s.draft = None)
                    .await;
                Reply::text(format::CONVERT_CANCELLED)
            }
            ButtonAction::ConvertDo => self.finish_conversion(conversation).await,
            ButtonAction::ConvertFrom(_)
            | ButtonAction::ConvertTo(_)
            | ButtonAction::ConvertAddMore
            | ButtonAction::ConvertSelectTo => self.advance_draft(conversation, action).await,
        }
    }

    fn selection_reply(&self, selected: &[CurrencyCode]) -> Reply {
        Reply::text(format::selection_prompt(selected.len()))
            .with_keyboard(keyboard::currency_selection(&self.registry, selected))
    }

    /// Steps of the guided conversion that only touch the draft.
    async fn advance_draft(&self, conversation: ConversationId, action: ButtonAction) -> Reply {
        self.sessions
            .with_session(conversation, |s| {
                let Some(draft) = s.draft.as_mut() else {
                    return Reply::text(format::STALE_BUTTON);
                };
                match (action, draft.stage) {
                    (ButtonAction::ConvertFrom(code), DraftStage::SelectingFrom) => {
                        draft.begin_item(code);
                        Reply::text(format::enter_amount(&code))
                    }
                    (ButtonAction::ConvertAddMore, DraftStage::SelectingFrom) => {
                        Reply::text(format::CONVERT_PICK_MORE)
                            .with_keyboard(keyboard::currency_list(&self.registry, Side::From))
                    }
                    (ButtonAction::ConvertSelectTo, DraftStage::SelectingFrom) => {
                        draft.stage = DraftStage::SelectingTo;
                        Reply::text(format::CONVERT_PICK_TO)
                            .with_keyboard(keyboard::currency_list(&self.registry, Side::To))
                    }
                    (ButtonAction::ConvertTo(code), DraftStage::SelectingTo) => {
                        if draft.items.is_empty() {
                            draft.stage = DraftStage::SelectingFrom;
                            return Reply::text(format::CONVERT_NEED_FROM)
                                .with_keyboard(keyboard::currency_list(&self.registry, Side::From));
                        }
                        draft.to = Some(code);
                        Reply::text(format::draft_summary(draft, &code))
                            .with_keyboard(keyboard::confirm_conversion())
                    }
                    (action, stage) => {
                        debug!(%action, ?stage, "Button does not fit the current step");
                        Reply::text(format::STALE_BUTTON)
                    }
                }
            })
            .await
    }

    async fn finish_conversion(&self, conversation: ConversationId) -> Reply {
        let draft = self
            .sessions
            .peek(conversation, |s| s.and_then(|s| s.draft.clone()))
            .await;
        let Some(draft) = draft else {
            return Reply::text(format::CONVERT_NOT_ENOUGH_DATA);
        };
        if draft.items.is_empty() || draft.to.is_none() {
            return Reply::text(format::CONVERT_NOT_ENOUGH_DATA);
        }
        if draft.has_missing_amounts() {
            return Reply::text(format::CONVERT_MISSING_AMOUNTS)
                .with_keyboard(keyboard::confirm_conversion());
        }

        self.sessions
            .with_session(conversation, |s| s.draft = None)
            .await;
        match draft.to_request() {
            Some(request) => self.execute(&request).await,
            None => Reply::text(format::CONVERT_NOT_ENOUGH_DATA),
        }
    }
}
