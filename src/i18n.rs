//! Internationalization (i18n) Support
//!
//! Closed tables of localized strings: the instruction hint prepended to
//! every completion prompt, the spoken fallbacks that stand in for failed
//! completions, and the user-visible status messages.
//! Missing entries fall back to the generic (English) table.

use crate::language::Language;

/// Keys of the localized string tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Message {
    /// Prefix telling the model which language to answer in
    InstructionHint,
    /// Endpoint returned an error status or could not be reached
    ServerError,
    /// Endpoint answered but with nothing usable
    NotUnderstood,
    /// Nothing was said
    PleaseSpeak,
    /// Placeholder reply while the completion is in flight
    Thinking,
    /// Microphone permission was refused
    PermissionDenied,
    /// Recognizer heard audio but matched no words
    NoMatch,
    /// Any other recognizer failure
    SpeechError,
}

const HINDI: &[(Message, &str)] = &[
    (Message::InstructionHint, "उत्तर हिंदी में दो: "),
    (Message::ServerError, "सर्वर से कनेक्शन में समस्या हुई।"),
    (Message::NotUnderstood, "मुझे समझ में नहीं आया। कृपया दोबारा कहें।"),
    (Message::PleaseSpeak, "कृपया कुछ बोलिए।"),
];

const TAMIL: &[(Message, &str)] = &[
    (Message::InstructionHint, "தமிழில் பதில் சொல்லுங்கள்: "),
    (Message::ServerError, "சர்வருடன் இணைப்பில் சிக்கல் ஏற்பட்டது."),
    (
        Message::NotUnderstood,
        "எனக்குப் புரியவில்லை. தயவுசெய்து மீண்டும் சொல்லுங்கள்.",
    ),
    (Message::PleaseSpeak, "தயவுசெய்து ஏதாவது பேசுங்கள்."),
];

const SINHALA: &[(Message, &str)] = &[
    (Message::InstructionHint, "සිංහලෙන් පිළිතුරු දෙන්න: "),
    (
        Message::ServerError,
        "සේවාදායකය සමඟ සම්බන්ධතාවයේ ගැටලුවක් ඇති විය.",
    ),
    (Message::NotUnderstood, "මට තේරුණේ නැහැ. කරුණාකර නැවත කියන්න."),
    (Message::PleaseSpeak, "කරුණාකර යමක් කතා කරන්න."),
];

/// Generic table; also serves English
const GENERIC: &[(Message, &str)] = &[
    (
        Message::InstructionHint,
        "Reply briefly and conversationally, in the same language as this message: ",
    ),
    (
        Message::ServerError,
        "There was a problem connecting to the server.",
    ),
    (
        Message::NotUnderstood,
        "I didn't understand that. Please say it again.",
    ),
    (Message::PleaseSpeak, "Please say something."),
    (Message::Thinking, "Thinking..."),
    (
        Message::PermissionDenied,
        "Microphone permission is required for voice recognition.",
    ),
    (
        Message::NoMatch,
        "I could not understand that. Please try again.",
    ),
    (
        Message::SpeechError,
        "An error occurred while detecting your speech.",
    ),
];

fn table(language: Language) -> &'static [(Message, &'static str)] {
    match language {
        Language::Hindi => HINDI,
        Language::Tamil => TAMIL,
        Language::Sinhala => SINHALA,
        Language::English => GENERIC,
    }
}

fn find(entries: &'static [(Message, &'static str)], key: Message) -> Option<&'static str> {
    entries.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Translate a message for the given language
pub fn tr(language: Language, key: Message) -> &'static str {
    find(table(language), key)
        .or_else(|| find(GENERIC, key))
        .unwrap_or_default()
}

/// Instruction hint for a completion prompt
pub fn instruction_hint(language: Language) -> &'static str {
    tr(language, Message::InstructionHint)
}
