//! Terminal rendering of chat turns and insights.

use colored::Colorize;
use pinechat_core::insights::{
    BusinessInsights, FetchState, InsightsPanel, PanelView, WeeklyInsights, format_currency,
    format_number, format_percentage,
};
use pinechat_core::session::{Message, Sender};

pub fn message(message: &Message) -> String {
    let time = message.timestamp.format("%H:%M");
    match message.sender {
        Sender::User => format!("{} {}", format!("[{}] You:", time).green(), message.content),
        Sender::Bot => {
            let mut out = format!("{}", format!("[{}] Assistant:", time).bright_blue());
            for line in message.content.lines() {
                out.push('\n');
                out.push_str("  ");
                out.push_str(line);
            }
            out
        }
    }
}

pub fn panel(panel: &InsightsPanel) -> String {
    let mut out = String::new();
    out.push_str(&panel.title().bold().to_string());
    if let Some(badge) = panel.badge() {
        out.push_str(&format!("  [{}]", badge).bright_black().to_string());
    }
    out.push('\n');
    out.push_str(&panel.subtitle().bright_black().to_string());

    if let PanelView::Ready {
        cards,
        business_text,
    } = &panel.view
    {
        if let Some(cards) = cards {
            out.push('\n');
            for card in cards {
                out.push_str(&format!("\n  {:<28}{}", card.title, card.display_value().bold()));
            }
        }
        if let Some(text) = business_text {
            out.push_str("\n\n");
            out.push_str(&business_analysis(text));
        }
    }
    out
}

fn business_analysis(text: &str) -> String {
    let mut out = "Business Insights Analysis".bold().to_string();
    for line in text.lines() {
        out.push_str("\n  ");
        out.push_str(line);
    }
    out
}

pub fn feed(state: &FetchState<BusinessInsights>) -> String {
    match state {
        FetchState::Idle | FetchState::Loading => "Loading business insights...".to_string(),
        FetchState::Error(message) => format!("{}", message.red()),
        FetchState::Success(feed) => business_analysis(&feed.insights),
    }
}

pub fn weekly(state: &FetchState<WeeklyInsights>) -> String {
    match state {
        FetchState::Idle | FetchState::Loading => "Loading weekly insights...".to_string(),
        FetchState::Error(message) => format!("{}", message.red()),
        FetchState::Success(w) => {
            let rows = [
                ("Total Transactions", format_number(w.total_transactions), Some(w.transaction_change)),
                ("Total Revenue", format_currency(w.total_revenue), Some(w.revenue_change)),
                ("Active Customers", format_number(w.active_customers), Some(w.customer_change)),
                ("Failure Rate", format_percentage(format_number(w.failure_rate)), Some(w.failure_change)),
                ("Average Ticket", format_currency(w.average_ticket), None),
                ("Top Payment Method", w.top_payment_method.clone(), None),
            ];

            let mut out = "Weekly Insights".bold().to_string();
            for (title, value, change) in rows {
                out.push_str(&format!("\n  {:<22}{}", title, value));
                if let Some(change) = change {
                    out.push_str(&format!("  {}", signed_change(change)));
                }
            }
            out
        }
    }
}

fn signed_change(change: f64) -> String {
    let text = if change > 0.0 {
        format!("+{}", format_percentage(format_number(change)))
    } else {
        format_percentage(format_number(change))
    };
    if change < 0.0 {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}
