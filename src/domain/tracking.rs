use rand::Rng;

const TRACKING_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// Synthetic UPS-style tracking id used when no reference number could be
// extracted from the uploaded label: "1Z" + 16 uppercase alphanumerics.
pub fn mock_tracking_id<R: Rng>(rng: &mut R) -> String {
    let mut id = String::with_capacity(18);
    id.push_str("1Z");

    for _ in 0..16 {
        let idx = rng.gen_range(0..TRACKING_ALPHABET.len());
        id.push(TRACKING_ALPHABET[idx] as char);
    }

    id
}

// Random UPC-A code: 11 digits plus the standard check digit
pub fn generate_upc<R: Rng>(rng: &mut R) -> String {
    let mut upc = String::with_capacity(12);
    for _ in 0..11 {
        upc.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }

    let check = upc_check_digit(&upc);
    upc.push(char::from(b'0' + check));
    upc
}

fn upc_check_digit(first_eleven: &str) -> u8 {
    let (mut odd_sum, mut even_sum) = (0u32, 0u32);

    for (i, c) in first_eleven.chars().enumerate() {
        let digit = c.to_digit(10).unwrap_or(0);
        if i % 2 == 0 {
            odd_sum += digit;
        } else {
            even_sum += digit;
        }
    }

    let modulo = (odd_sum * 3 + even_sum) % 10;
    if modulo != 0 {
        (10 - modulo) as u8
    } else {
        0
    }
}
