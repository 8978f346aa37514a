//! Sample slip for testing and demonstration.

use chrono::NaiveDate;

use crate::slip::{BarcodeData, Money, SlipRecord};

/// 1×1 transparent PNG, used for both logos so the sample renders anywhere.
pub const PIXEL_PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// A condominium fee slip with every optional field populated.
pub fn sample_slip() -> SlipRecord {
    SlipRecord {
        document_number: "000123".to_string(),
        payer_name: Some("Maria da Silva".to_string()),
        payee_name: "Condomínio Residencial Jardim das Flores".to_string(),
        original_amount: Money(152345),
        document_amount: Money(154890),
        value: Money(152345),
        reference_month: "03/2024".to_string(),
        agreement: None,
        payee_logo: PIXEL_PNG_DATA_URI.to_string(),
        bank_logo: PIXEL_PNG_DATA_URI.to_string(),
        bank_code: "001".to_string(),
        bank_check_digit: "9".to_string(),
        composition: vec![
            "Taxa condominial ................ 1.200,00".to_string(),
            "Fundo de reserva ................   120,00".to_string(),
            "Rateio de água ..................   203,45".to_string(),
        ],
        linked_units: "Bloco A - Apto 101, Garagem 12".to_string(),
        barcode: Some(BarcodeData {
            payload: "00193373700000001000500940144816060680935031".to_string(),
            digit_line: "00190.50095 40144.816069 06809.350314 3 37370000000100".to_string(),
        }),
        agency_account: "4042-8 / 61900-0".to_string(),
        species: "R$".to_string(),
        quantity: String::new(),
        our_number: "12345678901234567".to_string(),
        payee_document: "12345678000195".to_string(),
        due_date: Some(ymd(2024, 4, 10)),
        payment_location: "Pagável em qualquer banco até o vencimento".to_string(),
        document_date: Some(ymd(2024, 3, 1)),
        document_species: "DM".to_string(),
        acceptance: false,
        processing_date: Some(ymd(2024, 3, 5)),
        wallet: "18".to_string(),
        instructions: vec![
            "Não receber após 30 dias do vencimento.".to_string(),
            "Multa de 2% após o vencimento.".to_string(),
            "Juros de 1% ao mês.".to_string(),
        ],
        original_due_date: ymd(2024, 3, 10),
    }
}

/// `count` copies of the sample, each with its own document number.
pub fn sample_batch(count: usize) -> Vec<SlipRecord> {
    (0..count)
        .map(|i| {
            let mut slip = sample_slip();
            slip.document_number = format!("{:06}", 123 + i);
            slip
        })
        .collect()
}
