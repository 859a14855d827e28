use chrono::{DateTime, FixedOffset, Utc};
use rand::distributions::Uniform;
use rand::Rng;

const RECEIPT_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const RECEIPT_SUFFIX_LENGTH: usize = 8;
const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

/// Produces `RCP-YYYYMMDD-XXXXXXXX`. The suffix avoids look-alike characters
/// (0/O, 1/I) since donors read these back over the phone.
pub fn generate_receipt_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let index = Uniform::from(0..RECEIPT_ALPHABET.len());
    let suffix: String = (0..RECEIPT_SUFFIX_LENGTH)
        .map(|_| RECEIPT_ALPHABET[rng.sample(index)] as char)
        .collect();

    format!("RCP-{}-{}", now.format("%Y%m%d"), suffix)
}

/// Formats a rupee amount with Indian digit grouping, e.g. `₹12,34,567.5`.
/// Up to three decimals are kept, without trailing zeros.
pub fn format_rupees(amount: f64) -> String {
    let negative = amount < 0.0;
    let thousandths = (amount.abs() * 1000.0).round() as u64;
    let rupees = thousandths / 1000;
    let fraction = thousandths % 1000;

    let digits = rupees.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, last_three) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = vec![];
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), last_three)
    };

    let sign = if negative { "-" } else { "" };
    if fraction == 0 {
        format!("{}₹{}", sign, grouped)
    } else {
        let fraction = format!("{:03}", fraction);
        format!("{}₹{}.{}", sign, grouped, fraction.trim_end_matches('0'))
    }
}

/// Receipts are dated in Indian Standard Time.
fn receipt_date(created_at: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(IST_OFFSET_SECONDS) {
        Some(ist) => created_at.with_timezone(&ist).format("%-d %B %Y").to_string(),
        None => created_at.format("%-d %B %Y").to_string(),
    }
}

pub struct ReceiptDetails<'a> {
    pub receipt_number: &'a str,
    pub donor_name: &'a str,
    pub donor_email: &'a str,
    pub campaign_title: &'a str,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

pub fn render_receipt_text(details: &ReceiptDetails<'_>) -> String {
    let rule = "=====================================";
    format!(
        "{rule}\n         DONATION RECEIPT\n{rule}\n\n\
         Receipt No: {receipt}\n\
         Date: {date}\n\n\
         Donor Information:\n\
         Name: {name}\n\
         Email: {email}\n\n\
         Donation Details:\n\
         Campaign: {campaign}\n\
         Amount: {amount}\n\n\
         {rule}\n\
         Thank you for your generous donation!\n\
         SacchiSewa Foundation\n\
         {rule}",
        rule = rule,
        receipt = details.receipt_number,
        date = receipt_date(details.created_at),
        name = details.donor_name,
        email = details.donor_email,
        campaign = details.campaign_title,
        amount = format_rupees(details.amount),
    )
}

pub fn receipt_file_name(receipt_number: &str) -> String {
    format!("donation-receipt-{}.txt", receipt_number)
}
