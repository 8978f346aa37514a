//! Presentation formatting for values printed on the slip (Brazilian locale).

use chrono::NaiveDate;

use crate::slip::Money;

/// `1234567` cents → `"12.345,67"`.
pub fn currency(amount: Money) -> String {
    let cents = amount.cents();
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let units = (abs / 100).to_string();
    let fraction = abs % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, ch) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped},{fraction:02}")
}

/// `dd/mm/yyyy`.
pub fn date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Punctuate a CPF (11 digits) or CNPJ (14 digits). Any other input is
/// returned as given.
pub fn document(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        11 => format!(
            "{}.{}.{}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..11]
        ),
        14 => format!(
            "{}.{}.{}/{}-{}",
            &digits[0..2],
            &digits[2..5],
            &digits[5..8],
            &digits[8..12],
            &digits[12..14]
        ),
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(currency(Money(0)), "0,00");
        assert_eq!(currency(Money(5)), "0,05");
        assert_eq!(currency(Money(15000)), "150,00");
        assert_eq!(currency(Money(123456)), "1.234,56");
        assert_eq!(currency(Money(123456789)), "1.234.567,89");
        assert_eq!(currency(Money(-100050)), "-1.000,50");
    }

    #[test]
    fn date_is_day_first() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(date(d), "07/03/2024");
    }

    #[test]
    fn document_formats() {
        assert_eq!(document("12345678909"), "123.456.789-09");
        assert_eq!(document("12345678000195"), "12.345.678/0001-95");
        assert_eq!(document("12.345.678/0001-95"), "12.345.678/0001-95");
        assert_eq!(document("ABC"), "ABC");
    }
}
