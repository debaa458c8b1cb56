//! User-facing reply texts.

use ledgerbot_auth::Role;

pub const BALANCE_LOOKUP_FAILED: &str =
    "❌ There was an error retrieving your balance. Please try again later.";
pub const TRANSACTION_FAILED: &str =
    "❌ There was an error processing the transaction. Please try again later.";
pub const COMMAND_FAILED: &str = "There was an error while executing this command!";
pub const INVALID_AMOUNT: &str = "❌ **Invalid Amount:** Please enter a positive number.";

/// `$1,234,567` style, grouping digits in threes.
pub fn format_money(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn balance(value: u64) -> String {
    format!("💰 **Your Balance:** {}", format_money(value))
}

pub fn access_denied(role: &Role) -> String {
    format!("❌ **Access Denied:** You need the \"{role}\" role to use this command.")
}

pub fn credited(target: &str, amount: u64, new_balance: u64, actor: &str) -> String {
    format!(
        "💰 **Money Added Successfully!**\n\
         👤 **User:** {target}\n\
         ➕ **Amount Added:** {}\n\
         💳 **New Balance:** {}\n\
         👷‍♂️ **Added by:** {actor}",
        format_money(amount),
        format_money(new_balance),
    )
}

pub fn debited(target: &str, amount: u64, new_balance: u64, actor: &str) -> String {
    format!(
        "💸 **Money Removed Successfully!**\n\
         👤 **User:** {target}\n\
         ➖ **Amount Removed:** {}\n\
         💳 **New Balance:** {}\n\
         👷‍♂️ **Removed by:** {actor}",
        format_money(amount),
        format_money(new_balance),
    )
}

pub fn insufficient_funds(target: &str, available: u64, requested: u64) -> String {
    format!(
        "❌ **Insufficient Funds:** {target} only has {}, but you're trying to remove {} ({} short).",
        format_money(available),
        format_money(requested),
        format_money(requested.saturating_sub(available)),
    )
}
