use itertools::Itertools;
use std::convert::TryFrom;
use std::fmt;

pub mod batch;

pub use batch::{Batch, BatchError, MAX_CASE_PREFERENCES};

// The two finish styles a color can receive. Glossy is the default; the
// solver minimizes the number of colors switched to matte.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Style {
    Glossy,
    Matte,
}

impl TryFrom<usize> for Style {
    type Error = &'static str;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Style::Glossy),
            1 => Ok(Style::Matte),
            _ => Err("Not a valid Style. Must be in [01]"),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as usize)
    }
}

// A (color, style) pair a customer finds acceptable. Colors are 1-based,
// matching the input format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Preference {
    pub color: usize,
    pub style: Style,
}

impl Preference {
    pub fn new(color: usize, style: Style) -> Preference {
        Preference { color, style }
    }
}

// One puzzle instance: a color count and the preference list of each
// customer. Read-only once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Case {
    colors: usize,
    customers: Vec<Vec<Preference>>,
}

impl Case {
    // Returns Err if any preference points outside [1, colors], so the
    // checker never has to range-check.
    pub fn with_customers(
        colors: usize,
        customers: Vec<Vec<Preference>>,
    ) -> Result<Case, &'static str> {
        if colors == 0 {
            return Err("a Case must have at least one color");
        }
        if customers
            .iter()
            .flatten()
            .any(|p| p.color == 0 || p.color > colors)
        {
            return Err("preference color must be in [1, colors]");
        }
        Ok(Case { colors, customers })
    }

    pub fn colors(&self) -> usize {
        self.colors
    }

    pub fn customers(&self) -> &[Vec<Preference>] {
        &self.customers
    }
}

// One style per color, positionally indexed from color 1.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Assignment {
    styles: Vec<Style>,
}

impl Assignment {
    // Builds an all-glossy assignment with the given 0-based indices matte.
    pub fn with_matte(colors: usize, matte: &[usize]) -> Assignment {
        let mut styles = vec![Style::Glossy; colors];
        for &m in matte {
            styles[m] = Style::Matte;
        }
        Assignment { styles }
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    pub fn matte_count(&self) -> usize {
        self.styles.iter().filter(|&&s| s == Style::Matte).count()
    }

    // True iff every customer of the case has at least one preference this
    // assignment meets. Case construction guarantees the index is in range.
    pub fn satisfies(&self, case: &Case) -> bool {
        case.customers()
            .iter()
            .all(|prefs| prefs.iter().any(|p| self.styles[p.color - 1] == p.style))
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.styles.iter().format(" "))
    }
}

pub struct AssignmentAdaptor<I: Iterator> {
    iter: I,
    colors: usize,
}

impl<I> Iterator for AssignmentAdaptor<I>
where
    I: Iterator<Item = Vec<usize>>,
{
    type Item = Assignment;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|matte| Assignment::with_matte(self.colors, &matte))
    }
}

pub trait AssignmentIterator: Iterator {
    fn as_assignments(self, colors: usize) -> AssignmentAdaptor<Self>
    where
        Self: Sized + Iterator<Item = Vec<usize>>,
    {
        AssignmentAdaptor { iter: self, colors }
    }
}

impl<I: Iterator<Item = Vec<usize>>> AssignmentIterator for I {}

// Yields all 2^colors assignments exactly once, in non-decreasing matte
// count. Within one matte count, subsets come out of combinations() in
// lexicographic index order, so the sequence is fully deterministic.
pub fn assignments(colors: usize) -> impl Iterator<Item = Assignment> {
    (0..=colors).flat_map(move |k| (0..colors).combinations(k).as_assignments(colors))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Solution {
    Feasible(Assignment),
    Impossible,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solution::Feasible(a) => a.fmt(f),
            Solution::Impossible => write!(f, "IMPOSSIBLE"),
        }
    }
}

// Candidates arrive in ascending matte count, so the first satisfying one
// uses the fewest matte colors. Worst case scans all 2^colors candidates.
pub fn solve(case: &Case) -> Solution {
    match assignments(case.colors()).find(|a| a.satisfies(case)) {
        Some(a) => Solution::Feasible(a),
        None => Solution::Impossible,
    }
}

mod test {
    use super::*;

    #[allow(dead_code)]
    fn case(colors: usize, customers: &[&[(usize, usize)]]) -> Case {
        let customers = customers
            .iter()
            .map(|prefs| {
                prefs
                    .iter()
                    .map(|&(color, style)| Preference::new(color, Style::try_from(style).unwrap()))
                    .collect()
            })
            .collect();
        Case::with_customers(colors, customers).unwrap()
    }

    // Five colors with a satisfiable customer set, and one color wanted in
    // both styles at once.
    #[allow(dead_code)]
    const FIVE_COLORS: &[&[(usize, usize)]] = &[&[(1, 1)], &[(1, 0), (2, 0)], &[(5, 0)]];
    #[allow(dead_code)]
    const ONE_COLOR: &[&[(usize, usize)]] = &[&[(1, 0)], &[(1, 1)]];

    mod style_try_from {
        #[allow(unused_imports)]
        use super::*;

        #[test]
        fn glossy() {
            assert_eq!(Style::try_from(0), Ok(Style::Glossy));
        }

        #[test]
        fn matte() {
            assert_eq!(Style::try_from(1), Ok(Style::Matte));
        }

        #[test]
        fn out_of_range() {
            assert_eq!(
                Style::try_from(2),
                Err("Not a valid Style. Must be in [01]")
            );
        }
    }

    mod assignment_order {
        #[allow(unused_imports)]
        use super::*;
        #[allow(unused_imports)]
        use std::collections::HashSet;

        #[allow(dead_code)]
        fn choose(n: usize, k: usize) -> usize {
            (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
        }

        macro_rules! test {
            ($name: ident, $n: expr) => {
                #[test]
                fn $name() {
                    let all = assignments($n).collect_vec();
                    assert_eq!(all.len(), 1 << $n);
                    let distinct: HashSet<&Assignment> = all.iter().collect();
                    assert_eq!(distinct.len(), all.len());
                    assert!(all
                        .windows(2)
                        .all(|w| w[0].matte_count() <= w[1].matte_count()));
                    for k in 0..=$n {
                        let with_k = all.iter().filter(|a| a.matte_count() == k).count();
                        assert_eq!(with_k, choose($n, k), "n={} k={}", $n, k);
                    }
                }
            };
        }

        test!(one_color, 1);
        test!(two_colors, 2);
        test!(three_colors, 3);
        test!(four_colors, 4);
        test!(six_colors, 6);

        #[test]
        fn first_and_last_of_five() {
            let all = assignments(5).collect_vec();
            assert_eq!(all.first(), Some(&Assignment::with_matte(5, &[])));
            assert_eq!(
                all.last(),
                Some(&Assignment::with_matte(5, &[0, 1, 2, 3, 4]))
            );
        }

        #[test]
        fn matte_run_lengths_of_five() {
            let runs: Vec<usize> = assignments(5).map(|a| a.matte_count()).collect();
            let expected: Vec<usize> = [(1, 0), (5, 1), (10, 2), (10, 3), (5, 4), (1, 5)]
                .iter()
                .flat_map(|&(len, k)| std::iter::repeat(k).take(len))
                .collect();
            assert_eq!(runs, expected);
        }

        #[test]
        fn restartable() {
            assert_eq!(assignments(3).collect_vec(), assignments(3).collect_vec());
        }
    }

    mod satisfies {
        #[allow(unused_imports)]
        use super::*;

        macro_rules! test {
            ($name: ident, $colors: expr, $customers: expr, $matte: expr, $expected: expr) => {
                #[test]
                fn $name() {
                    let case = case($colors, $customers);
                    let assignment = Assignment::with_matte($colors, $matte);
                    assert_eq!(assignment.satisfies(&case), $expected);
                }
            };
        }

        test!(minimal, 5, FIVE_COLORS, &[0], true);
        test!(all_glossy, 5, FIVE_COLORS, &[], false);
        // More matte than needed still counts as feasible.
        test!(inefficient, 5, FIVE_COLORS, &[0, 2, 3], true);
        test!(conflict_glossy, 1, ONE_COLOR, &[], false);
        test!(conflict_matte, 1, ONE_COLOR, &[0], false);
        test!(empty_preferences1, 2, &[&[(1, 0)], &[]], &[], false);
        test!(empty_preferences2, 2, &[&[(1, 0)], &[]], &[0, 1], false);
        test!(no_customers, 3, &[], &[], true);
        test!(duplicates, 2, &[&[(2, 1), (2, 1)]], &[1], true);
    }

    mod solver {
        #[allow(unused_imports)]
        use super::*;

        #[test]
        fn five_colors_needs_one_matte() {
            assert_eq!(
                solve(&case(5, FIVE_COLORS)),
                Solution::Feasible(Assignment::with_matte(5, &[0]))
            );
        }

        #[test]
        fn one_color_impossible() {
            assert_eq!(solve(&case(1, ONE_COLOR)), Solution::Impossible);
        }

        #[test]
        fn no_customers_all_glossy() {
            assert_eq!(
                solve(&case(3, &[])),
                Solution::Feasible(Assignment::with_matte(3, &[]))
            );
        }

        #[test]
        fn idempotent() {
            let case = case(5, FIVE_COLORS);
            assert_eq!(solve(&case), solve(&case));
        }

        #[test]
        fn minimal_matte_count() {
            let case = case(5, FIVE_COLORS);
            match solve(&case) {
                Solution::Feasible(best) => {
                    for other in assignments(5).filter(|a| a.matte_count() < best.matte_count()) {
                        assert!(!other.satisfies(&case), "cheaper assignment {}", other);
                    }
                }
                Solution::Impossible => assert!(false, "case is satisfiable"),
            }
        }
    }

    mod format {
        #[allow(unused_imports)]
        use super::*;

        #[test]
        fn assignment() {
            assert_eq!(format!("{}", Assignment::with_matte(5, &[0])), "1 0 0 0 0");
        }

        #[test]
        fn single_color() {
            assert_eq!(format!("{}", Assignment::with_matte(1, &[])), "0");
        }

        #[test]
        fn feasible() {
            assert_eq!(
                format!("{}", Solution::Feasible(Assignment::with_matte(2, &[1]))),
                "0 1"
            );
        }

        #[test]
        fn impossible() {
            assert_eq!(format!("{}", Solution::Impossible), "IMPOSSIBLE");
        }
    }

    mod case_invariants {
        #[allow(unused_imports)]
        use super::*;

        #[test]
        fn zero_colors() {
            assert_eq!(
                Case::with_customers(0, Vec::new()),
                Err("a Case must have at least one color")
            );
        }

        #[test]
        fn color_out_of_range() {
            assert_eq!(
                Case::with_customers(2, vec![vec![Preference::new(3, Style::Glossy)]]),
                Err("preference color must be in [1, colors]")
            );
        }

        #[test]
        fn color_zero() {
            assert_eq!(
                Case::with_customers(2, vec![vec![Preference::new(0, Style::Matte)]]),
                Err("preference color must be in [1, colors]")
            );
        }
    }
}
