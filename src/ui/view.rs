use crate::session::{Speaker, Transcript, Turn};
use crate::ui::format::{escape_html, format_agent_text, format_user_text, FormattedText};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleView {
    pub speaker: Speaker,
    pub author: &'static str,
    pub time: String,
    pub body: FormattedText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowView {
    Bubble(BubbleView),
    Typing,
}

pub fn author(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => "You",
        Speaker::Agent => "Assistant",
    }
}

fn css_class(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => "user",
        Speaker::Agent => "bot",
    }
}

pub fn bubble(turn: &Turn) -> BubbleView {
    let body = match turn.speaker {
        Speaker::User => format_user_text(&turn.text),
        Speaker::Agent => format_agent_text(&turn.text),
    };
    BubbleView {
        speaker: turn.speaker,
        author: author(turn.speaker),
        time: turn.timestamp.clone(),
        body,
    }
}

/// Rows to draw, top to bottom. The typing indicator, when shown, is last.
pub fn project(transcript: &Transcript) -> Vec<RowView> {
    let mut rows: Vec<RowView> = transcript
        .turns()
        .iter()
        .map(|turn| RowView::Bubble(bubble(turn)))
        .collect();
    if transcript.is_typing() {
        rows.push(RowView::Typing);
    }
    rows
}

/// The transcript as a self-contained HTML fragment.
pub fn transcript_html(transcript: &Transcript) -> String {
    let mut html = String::from("<div class=\"chat-messages\">\n");
    for row in project(transcript) {
        match row {
            RowView::Bubble(bubble) => {
                let class = css_class(bubble.speaker);
                html.push_str(&format!(
                    "<div class=\"message {class}-message\"><div class=\"message-author\">{}</div><div class=\"message-bubble\"><p>{}</p></div><div class=\"message-time\">{}</div></div>\n",
                    bubble.author,
                    bubble.body.to_html(),
                    escape_html(&bubble.time),
                ));
            }
            RowView::Typing => {
                html.push_str(
                    "<div class=\"message bot-message typing-indicator-message\"><div class=\"message-bubble typing-indicator\"><span></span><span></span><span></span></div></div>\n",
                );
            }
        }
    }
    html.push_str("</div>\n");
    html
}
