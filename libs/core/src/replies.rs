//! User-visible reply texts. All replies are sent with `parse_mode=HTML`.

use unicode_segmentation::UnicodeSegmentation;

use crate::types::Reply;

pub const OPEN_LINK_LABEL: &str = "🔗 Open Link";

pub fn welcome() -> Reply {
    Reply::text(
        "<b>👋 Welcome to TeraBox Converter Bot!</b>\n\n\
         🔹 Use /login to connect your TeraBox account (BDUSS + STOKEN)\n\
         🔹 Send any TeraBox link after login to convert it via your account\n\
         🔹 Use /logout to disconnect your account\n\n\
         <i>Safe multi-user system, every user uses their own account</i> 🔐",
    )
}

pub fn help() -> Reply {
    Reply::text(
        "<b>🧩 Available Commands:</b>\n\
         /start - Show welcome message\n\
         /help - Show this help menu\n\
         /login - Login with BDUSS + STOKEN\n\
         /logout - Remove your account",
    )
}

pub fn login_prompt() -> Reply {
    Reply::text(
        "🔑 <b>Login to your TeraBox account</b>\n\n\
         Please send your TeraBox cookie (format):\n\n\
         <code>BDUSS=xxxx; STOKEN=yyyy;</code>\n\n\
         ⚠️ Do not share this cookie with anyone!",
    )
}

pub fn logged_out() -> Reply {
    Reply::text("✅ You have been logged out and your cookie removed.")
}

pub fn invalid_cookie() -> Reply {
    Reply::text("❌ Invalid cookie format. Must contain BDUSS and STOKEN.")
}

pub fn connected() -> Reply {
    Reply::text("✅ Your TeraBox account is connected! Now send any TeraBox link to convert.")
}

pub fn send_valid_link() -> Reply {
    Reply::text("⚠️ Please send a valid TeraBox link!")
}

pub fn login_first() -> Reply {
    Reply::text("🔐 Please login first using /login and send your cookie.")
}

pub fn invalid_link() -> Reply {
    Reply::text("❌ Invalid TeraBox link format.")
}

pub fn copying() -> Reply {
    Reply::text("⏳ Copying file to your TeraBox account...")
}

pub fn save_failed() -> Reply {
    Reply::text("⚠️ Failed to save file. Please check your cookie or the link.")
}

pub fn saved_no_share() -> Reply {
    Reply::text("✅ File saved, but could not create a new share link automatically.")
}

pub fn share_failed() -> Reply {
    Reply::text("❌ File saved, but failed to create a share link.")
}

pub fn link_not_found() -> Reply {
    Reply::text("✅ File saved but link not found. Check your TeraBox manually.")
}

pub fn converted(link: &str) -> Reply {
    Reply::text(format!(
        "✅ File copied successfully!\n\n<b>New Link:</b> {}",
        html_escape(link)
    ))
    .with_link(OPEN_LINK_LABEL, link)
}

pub fn store_error() -> Reply {
    Reply::text("⚠️ Something went wrong on our side. Please try again later.")
}

pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for grapheme in UnicodeSegmentation::graphemes(text, true) {
        escaped.push_str(match grapheme {
            "&" => "&amp;",
            "<" => "&lt;",
            ">" => "&gt;",
            _ => grapheme,
        });
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converted_escapes_text_but_not_button_url() {
        let reply = converted("https://terabox.com/s/1a?x=1&y=2");
        assert!(reply.text.contains("x=1&amp;y=2"));
        let link = reply.link.expect("button");
        assert_eq!(link.url, "https://terabox.com/s/1a?x=1&y=2");
        assert_eq!(link.label, OPEN_LINK_LABEL);
    }

    #[test]
    fn plain_replies_have_no_button() {
        for reply in [welcome(), help(), login_prompt(), save_failed(), link_not_found()] {
            assert!(reply.link.is_none());
        }
    }

    #[test]
    fn help_lists_every_command() {
        let text = help().text;
        for cmd in ["/start", "/help", "/login", "/logout"] {
            assert!(text.contains(cmd), "missing {cmd}");
        }
    }
}
