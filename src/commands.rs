/// A voice command recognized from a final transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask the boss over SMS whether they can join the call.
    JoinBoss,
    /// Relay a question to the boss over SMS; carries the question body.
    Question(String),
    /// Repeat the boss's last reply into the call.
    Repeat,
}

/// The wake-phrase aliases accepted after the leading "hey". "Barnes" and
/// "Bones" cover what speech recognition tends to make of the name.
const ALIASES: [&str; 3] = ["bones", "Bones", "Barnes"];

type Matcher = fn(&str, &str) -> Option<Command>;

/// Matchers in priority order. Join must come before Question: its phrase is
/// a superset of Question's prefix, and Question would otherwise swallow it.
const MATCHERS: [Matcher; 3] = [match_join, match_question, match_repeat];

/// Match a final transcript against the command grammar, first match wins.
pub fn recognize(transcript: &str, boss_name: &str) -> Option<Command> {
    MATCHERS.iter().find_map(|m| m(transcript, boss_name))
}

fn match_join(transcript: &str, boss_name: &str) -> Option<Command> {
    let rest = after_wake_phrase(transcript)?;
    let phrase = format!("ask {} to join the call", boss_name);
    find_phrase_ci(rest, &phrase)?;
    Some(Command::JoinBoss)
}

fn match_question(transcript: &str, boss_name: &str) -> Option<Command> {
    let rest = after_wake_phrase(transcript)?;
    let phrase = format!("ask {}", boss_name);
    let (_, end) = find_phrase_ci(rest, &phrase)?;
    let body = rest[end..]
        .trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == '.' || c == ':')
        .trim_end();
    Some(Command::Question(body.to_string()))
}

fn match_repeat(transcript: &str, _boss_name: &str) -> Option<Command> {
    let rest = after_wake_phrase(transcript)?;
    find_first(rest, &["repeat that", "say that again"])?;
    Some(Command::Repeat)
}

/// Locate the wake phrase ("hey" then one of the aliases) and return the
/// instruction clause that follows it.
fn after_wake_phrase(transcript: &str) -> Option<&str> {
    let (_, hey_end) = find_first(transcript, &["hey", "Hey"])?;
    let rest = &transcript[hey_end..];
    let (_, alias_end) = find_first(rest, &ALIASES)?;
    Some(&rest[alias_end..])
}

/// Earliest occurrence of any needle; returns (start, end) byte offsets.
fn find_first(haystack: &str, needles: &[&str]) -> Option<(usize, usize)> {
    needles
        .iter()
        .filter_map(|n| haystack.find(n).map(|i| (i, i + n.len())))
        .min_by_key(|(start, _)| *start)
}

/// ASCII case-insensitive phrase search; returns offsets into the original.
fn find_phrase_ci(haystack: &str, phrase: &str) -> Option<(usize, usize)> {
    let lowered = haystack.to_ascii_lowercase();
    let phrase = phrase.to_ascii_lowercase();
    lowered.find(&phrase).map(|i| (i, i + phrase.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_request_fires_before_question() {
        let cmd = recognize("hey bones, ask dave to join the call", "Dave");
        assert_eq!(cmd, Some(Command::JoinBoss));
    }

    #[test]
    fn test_question_captures_trailing_text() {
        let cmd = recognize("hey Barnes ask Dave what time is the meeting", "Dave");
        assert_eq!(
            cmd,
            Some(Command::Question("what time is the meeting".to_string()))
        );
    }

    #[test]
    fn test_question_after_punctuation() {
        let cmd = recognize("Hey Bones, ask Dave, is the demo ready?", "Dave");
        assert_eq!(
            cmd,
            Some(Command::Question("is the demo ready?".to_string()))
        );
    }

    #[test]
    fn test_repeat_that() {
        let cmd = recognize("hey Bones, repeat that", "Dave");
        assert_eq!(cmd, Some(Command::Repeat));
    }

    #[test]
    fn test_say_that_again() {
        let cmd = recognize("Hey Barnes could you say that again", "Dave");
        assert_eq!(cmd, Some(Command::Repeat));
    }

    #[test]
    fn test_no_wake_phrase_no_command() {
        assert_eq!(recognize("ask Dave to join the call", "Dave"), None);
        assert_eq!(recognize("repeat that please", "Dave"), None);
    }

    #[test]
    fn test_wake_phrase_alone_is_not_a_command() {
        assert_eq!(recognize("hey bones how are you", "Dave"), None);
    }

    #[test]
    fn test_alias_required_after_hey() {
        assert_eq!(recognize("hey everyone, ask Dave to join the call", "Dave"), None);
    }

    #[test]
    fn test_first_match_wins_exactly_one_command() {
        // Contains both the join phrase and a repeat phrase; join wins.
        let cmd = recognize(
            "hey bones ask Dave to join the call and then repeat that",
            "Dave",
        );
        assert_eq!(cmd, Some(Command::JoinBoss));
    }

    #[test]
    fn test_boss_name_is_configurable() {
        let cmd = recognize("hey bones ask Priya to join the call", "Priya");
        assert_eq!(cmd, Some(Command::JoinBoss));
        assert_eq!(recognize("hey bones ask Priya to join the call", "Dave"), None);
    }
}
