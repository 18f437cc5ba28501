use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"-?\d+").expect("integer pattern is valid");
}

/// Guesses the correct option of an arithmetic prompt by summing its first two
/// integers. Display only: the submitted answer never depends on it.
pub fn probable_correct_index(prompt: &str, options: &[String]) -> Option<usize> {
    let mut numbers = INTEGER
        .find_iter(prompt)
        .filter_map(|m| m.as_str().parse::<i64>().ok());
    let a = numbers.next()?;
    let b = numbers.next()?;
    let expected = a.checked_add(b)?.to_string();
    options.iter().position(|option| option.trim() == expected)
}
