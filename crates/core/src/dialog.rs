use crate::domain::Course;

pub const WELCOME: &str = "Привет! Я помогу выбрать между программами ИТМО «Искусственный интеллект» и «AI Product», \
объясню различия, подскажу по учебным планам и порекомендую элективы под ваш бэкграунд.\n\n\
Напишите: ai — если интересует «Искусственный интеллект»,\n\
или ai_product — «Управление ИИ-продуктами». \
Позже можно поменять выбор командой /switch.";

pub const BACKGROUND_HELP: &str = "Расскажите кратко про ваш бэкграунд. Варианты: \
junior_ml, data_engineer, product_manager, backend, research. \
Можно одной фразой: «я джун ML, хочу в прод» — я распознаю.";

pub const ASK_PROGRAM: &str = "Напишите: ai или ai_product.";
pub const SWITCHED: &str = "Ок, выберем программу заново. Напишите ai или ai_product.";
pub const NEED_PROGRAM: &str = "Сначала выберите программу: ai или ai_product";
pub const NO_RECOMMENDATIONS: &str =
    "Пока не нашёл подходящих элективов в плане. Попробуйте другой бэкграунд.";
pub const RECOMMENDATIONS_HEADER: &str = "Рекомендованные элективы под ваш профиль:";
pub const SYNC_DONE: &str = "Данные обновлены. Задавайте вопросы!";

pub const CONSOLE_ASK_PROGRAM: &str = "Введите ai или ai_product.";
pub const CONSOLE_ASK_BACKGROUND: &str = "Ок. Кратко опишите бэкграунд \
(например: junior_ml, product_manager, backend, data_engineer, research).";
pub const CONSOLE_READY: &str =
    "Принято. Спросите что-нибудь по обучению или введите :reco для рекомендаций.";

pub const PROGRAM_CODES: &[&str] = &["ai", "ai_product"];

/// Background key from a free-form self description. First rule wins.
pub fn map_background(text: &str) -> Option<&'static str> {
    const RULES: &[(&[&str], &str)] = &[
        (&["product", "продукт", "pm"], "product_manager"),
        (&["ml", "data scientist", "джун"], "junior_ml"),
        (&["data eng", "инженер данных"], "data_engineer"),
        (&["backend", "бэкенд"], "backend"),
        (&["research", "ресерч", "наука"], "research"),
    ];
    let lower = text.to_lowercase();
    RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, key)| *key)
}

/// How an unrecognized background answer is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundPolicy {
    /// Ask again until a known background is recognized.
    Strict,
    /// Keep the lowercased answer as the key.
    Lenient,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub program_code: Option<String>,
    pub background_key: Option<String>,
}

/// Outcome of one message in the setup flow. Front ends phrase the replies
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    AskProgram,
    ProgramChosen(String),
    AskBackground,
    BackgroundSet(String),
    /// The message is a question for the QA service.
    Question(String),
}

impl Step {
    /// Telegram wording; `None` for questions.
    pub fn bot_reply(&self) -> Option<String> {
        match self {
            Step::AskProgram => Some(ASK_PROGRAM.to_string()),
            Step::ProgramChosen(code) => Some(format!(
                "Вы выбрали программу: {code}. Теперь расскажите про ваш бэкграунд.\n{BACKGROUND_HELP}"
            )),
            Step::AskBackground => Some(BACKGROUND_HELP.to_string()),
            Step::BackgroundSet(key) => Some(format!(
                "Отлично, учту ваш профиль: {key}. Задавайте вопросы по обучению или вызовите /recommend."
            )),
            Step::Question(_) => None,
        }
    }

    /// Console wording; `None` for questions.
    pub fn console_reply(&self) -> Option<String> {
        match self {
            Step::AskProgram => Some(CONSOLE_ASK_PROGRAM.to_string()),
            Step::ProgramChosen(_) => Some(CONSOLE_ASK_BACKGROUND.to_string()),
            Step::AskBackground => Some(BACKGROUND_HELP.to_string()),
            Step::BackgroundSet(_) => Some(CONSOLE_READY.to_string()),
            Step::Question(_) => None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn switch_program(&mut self) {
        self.program_code = None;
    }

    pub fn is_ready(&self) -> bool {
        self.program_code.is_some() && self.background_key.is_some()
    }

    /// Advances the program → background → questions flow by one message.
    pub fn step(&mut self, text: &str, policy: BackgroundPolicy) -> Step {
        let text = text.trim();
        if self.program_code.is_none() {
            let code = text.to_lowercase();
            if !PROGRAM_CODES.contains(&code.as_str()) {
                return Step::AskProgram;
            }
            self.program_code = Some(code.clone());
            return Step::ProgramChosen(code);
        }
        if self.background_key.is_none() {
            let key = match (map_background(text), policy) {
                (Some(key), _) => key.to_string(),
                (None, BackgroundPolicy::Lenient) if !text.is_empty() => text.to_lowercase(),
                (None, _) => return Step::AskBackground,
            };
            self.background_key = Some(key.clone());
            return Step::BackgroundSet(key);
        }
        Step::Question(text.to_string())
    }

    /// Why recommendations cannot be produced yet, if they cannot.
    pub fn recommendation_blocker(&self) -> Option<&'static str> {
        if self.program_code.is_none() {
            Some(NEED_PROGRAM)
        } else if self.background_key.is_none() {
            Some(BACKGROUND_HELP)
        } else {
            None
        }
    }
}

pub fn format_recommendations(courses: &[Course]) -> String {
    if courses.is_empty() {
        return NO_RECOMMENDATIONS.to_string();
    }
    let mut message = RECOMMENDATIONS_HEADER.to_string();
    for course in courses {
        message.push_str(&format!(
            "\n• {} (семестр {}, теги: {})",
            course.name,
            course.semester_label(),
            course.tags_label()
        ));
    }
    message
}
