use crate::{solve, Case, Preference, Style};
use itertools::Itertools;
use std::convert::TryFrom;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

// Cumulative preference-pair cap per case; a larger case aborts the batch.
pub const MAX_CASE_PREFERENCES: usize = 3000;

#[derive(Debug)]
pub enum BatchError {
    Io(std::io::Error),
    Structure,
    CaseTooLarge,
}

impl From<std::io::Error> for BatchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::Io(e) => write!(f, "I/O error: {}", e),
            BatchError::Structure => write!(f, "the structure of the data is incorrect"),
            BatchError::CaseTooLarge => {
                write!(f, "this test case is too large and will not proceed")
            }
        }
    }
}

impl std::error::Error for BatchError {}

// All cases of one input file. Parsing is all-or-nothing: any error drops
// the whole batch, so no partial results are ever reported.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    cases: Vec<Case>,
}

impl Batch {
    pub fn from_bufread<R: BufRead>(br: R) -> Result<Batch, BatchError> {
        let mut lines = br.lines();
        let count = parse_count(&next_line(&mut lines)?)?;
        let mut cases = Vec::with_capacity(count);
        for _ in 0..count {
            cases.push(read_case(&mut lines)?);
        }
        Ok(Batch { cases })
    }

    pub fn from_reader<R: Read>(r: R) -> Result<Batch, BatchError> {
        Self::from_bufread(BufReader::new(r))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Batch, BatchError> {
        let file = File::open(path).map_err(BatchError::Io)?;
        Self::from_bufread(BufReader::new(file))
    }

    pub fn from_str(s: &str) -> Result<Batch, BatchError> {
        Self::from_reader(s.as_bytes())
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    // One "Case #<n>: <solution>" line per case, in input order.
    pub fn report(&self) -> Vec<String> {
        self.cases
            .iter()
            .enumerate()
            .map(|(i, case)| format!("Case #{}: {}", i + 1, solve(case)))
            .collect()
    }
}

fn next_line<R: BufRead>(lines: &mut Lines<R>) -> Result<String, BatchError> {
    match lines.next() {
        Some(Ok(line)) => Ok(line),
        Some(Err(e)) => Err(BatchError::Io(e)),
        None => Err(BatchError::Structure),
    }
}

fn parse_count(token: &str) -> Result<usize, BatchError> {
    token.trim().parse().map_err(|_| BatchError::Structure)
}

// A case block: a colors line, a customers line, then one preference line
// per customer holding the declared pair count and exactly that many
// (color, style) pairs. The size cap is checked as each declared count comes
// in, before the pairs on that line are validated.
fn read_case<R: BufRead>(lines: &mut Lines<R>) -> Result<Case, BatchError> {
    let colors = parse_count(&next_line(lines)?)?;
    let customer_count = parse_count(&next_line(lines)?)?;
    let mut customers = Vec::with_capacity(customer_count);
    let mut total_preferences = 0;
    for _ in 0..customer_count {
        let line = next_line(lines)?;
        let mut tokens = line.split_whitespace();
        let declared = match tokens.next() {
            Some(token) => parse_count(token)?,
            None => return Err(BatchError::Structure),
        };
        total_preferences += declared;
        if total_preferences > MAX_CASE_PREFERENCES {
            return Err(BatchError::CaseTooLarge);
        }
        let pairs = tokens.collect_vec();
        if pairs.len() != declared * 2 {
            return Err(BatchError::Structure);
        }
        let mut preferences = Vec::with_capacity(declared);
        for (color, style) in pairs.into_iter().tuples() {
            let color = parse_count(color)?;
            let style = Style::try_from(parse_count(style)?).map_err(|_| BatchError::Structure)?;
            preferences.push(Preference::new(color, style));
        }
        customers.push(preferences);
    }
    Case::with_customers(colors, customers).map_err(|_| BatchError::Structure)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CASES: &str = "2\n5\n3\n1 1 1\n2 1 0 2 0\n1 5 0\n1\n2\n1 1 0\n1 1 1\n";

    fn customer_line(pairs: usize) -> String {
        let mut line = pairs.to_string();
        for _ in 0..pairs {
            line.push_str(" 1 0");
        }
        line
    }

    #[test]
    fn parses_two_cases() {
        let batch = Batch::from_str(TWO_CASES).unwrap();
        assert_eq!(batch.cases().len(), 2);

        let first = &batch.cases()[0];
        assert_eq!(first.colors(), 5);
        assert_eq!(
            first.customers(),
            [
                vec![Preference::new(1, Style::Matte)],
                vec![
                    Preference::new(1, Style::Glossy),
                    Preference::new(2, Style::Glossy)
                ],
                vec![Preference::new(5, Style::Glossy)],
            ]
        );

        let second = &batch.cases()[1];
        assert_eq!(second.colors(), 1);
        assert_eq!(
            second.customers(),
            [
                vec![Preference::new(1, Style::Glossy)],
                vec![Preference::new(1, Style::Matte)],
            ]
        );
    }

    #[test]
    fn reports_two_cases() {
        let batch = Batch::from_str(TWO_CASES).unwrap();
        assert_eq!(batch.report(), ["Case #1: 1 0 0 0 0", "Case #2: IMPOSSIBLE"]);
    }

    #[test]
    fn empty_input() {
        assert!(matches!(Batch::from_str(""), Err(BatchError::Structure)));
    }

    #[test]
    fn missing_customer_line() {
        let input = "1\n5\n2\n1 1 1\n";
        assert!(matches!(Batch::from_str(input), Err(BatchError::Structure)));
    }

    #[test]
    fn pair_count_mismatch() {
        let input = "1\n5\n1\n2 1 0\n";
        assert!(matches!(Batch::from_str(input), Err(BatchError::Structure)));
    }

    #[test]
    fn malformed_number() {
        let input = "1\nfive\n1\n1 1 1\n";
        assert!(matches!(Batch::from_str(input), Err(BatchError::Structure)));
    }

    #[test]
    fn color_out_of_range() {
        let input = "1\n5\n1\n1 6 0\n";
        assert!(matches!(Batch::from_str(input), Err(BatchError::Structure)));
    }

    #[test]
    fn style_out_of_range() {
        let input = "1\n5\n1\n1 1 2\n";
        assert!(matches!(Batch::from_str(input), Err(BatchError::Structure)));
    }

    #[test]
    fn zero_colors() {
        let input = "1\n0\n0\n";
        assert!(matches!(Batch::from_str(input), Err(BatchError::Structure)));
    }

    #[test]
    fn customer_with_no_preferences() {
        // A lone count of zero parses to an empty preference list, which no
        // assignment can satisfy.
        let batch = Batch::from_str("1\n1\n1\n0\n").unwrap();
        assert_eq!(batch.report(), ["Case #1: IMPOSSIBLE"]);
    }

    #[test]
    fn oversized_declaration() {
        // The cap fires on the declared count alone, before the line's pairs
        // are checked.
        let input = "1\n1\n1\n3001\n";
        assert!(matches!(
            Batch::from_str(input),
            Err(BatchError::CaseTooLarge)
        ));
    }

    #[test]
    fn oversized_across_customers() {
        let input = format!("1\n1\n2\n{}\n{}\n", customer_line(1501), customer_line(1501));
        assert!(matches!(
            Batch::from_str(&input),
            Err(BatchError::CaseTooLarge)
        ));
    }

    #[test]
    fn exactly_at_the_cap() {
        let input = format!("1\n1\n2\n{}\n{}\n", customer_line(1500), customer_line(1500));
        let batch = Batch::from_str(&input).unwrap();
        assert_eq!(batch.cases()[0].customers().len(), 2);
        assert_eq!(batch.cases()[0].customers()[0].len(), 1500);
    }

    #[test]
    fn cap_resets_between_cases() {
        let case = format!("1\n1\n{}\n", customer_line(1600));
        let input = format!("2\n{}{}", case, case);
        assert_eq!(Batch::from_str(&input).unwrap().cases().len(), 2);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            format!("{}", BatchError::Structure),
            "the structure of the data is incorrect"
        );
        assert_eq!(
            format!("{}", BatchError::CaseTooLarge),
            "this test case is too large and will not proceed"
        );
    }
}
