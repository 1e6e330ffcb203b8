/// The sequence the visualizer starts from and returns to on reset.
pub const DEMO_SEQUENCE: [u32; 5] = [5, 1, 4, 2, 8];

/// Bubble sort, one comparison per `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleSort {
    initial: Vec<u32>,
    values: Vec<u32>,
    outer: usize,
    inner: usize,
    sorting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Idle,
    Compared,
    Sorted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Step,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Compared { swapped: bool },
    Finished { swapped: bool },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortView {
    pub items: Vec<(u32, Mark)>,
    pub control: Control,
}

impl BubbleSort {
    pub fn new(values: Vec<u32>) -> Self {
        let mut sort = Self {
            initial: values.clone(),
            values,
            outer: 0,
            inner: 0,
            sorting: true,
        };
        sort.check_finished();
        sort
    }

    pub fn demo() -> Self {
        Self::new(DEMO_SEQUENCE.to_vec())
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn is_sorting(&self) -> bool {
        self.sorting
    }

    /// The pair the next `advance` compares.
    pub fn cursor(&self) -> Option<(usize, usize)> {
        self.sorting.then_some((self.inner, self.inner + 1))
    }

    /// Compares the pair under the cursor and swaps it when out of order.
    /// Once the sequence is sorted the control turns into a reset.
    pub fn advance(&mut self) -> Step {
        if !self.sorting {
            self.reset();
            return Step::Reset;
        }

        let j = self.inner;
        let swapped = self.values[j] > self.values[j + 1];
        if swapped {
            self.values.swap(j, j + 1);
        }

        self.inner += 1;
        if self.inner >= self.pass_len() {
            self.inner = 0;
            self.outer += 1;
        }

        if self.check_finished() {
            log::debug!("sorted {:?}", self.values);
            Step::Finished { swapped }
        } else {
            Step::Compared { swapped }
        }
    }

    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.outer = 0;
        self.inner = 0;
        self.sorting = true;
        self.check_finished();
    }

    pub fn view(&self) -> SortView {
        let compared = self.cursor();
        let items = self
            .values
            .iter()
            .enumerate()
            .map(|(idx, &value)| {
                let mark = match compared {
                    None => Mark::Sorted,
                    Some((a, b)) if idx == a || idx == b => Mark::Compared,
                    Some(_) => Mark::Idle,
                };
                (value, mark)
            })
            .collect();

        SortView {
            items,
            control: if self.sorting {
                Control::Step
            } else {
                Control::Reset
            },
        }
    }

    // comparisons left in the current outer pass
    fn pass_len(&self) -> usize {
        self.values.len().saturating_sub(self.outer + 1)
    }

    fn check_finished(&mut self) -> bool {
        if self.outer + 1 >= self.values.len() {
            self.sorting = false;
        }
        !self.sorting
    }
}

impl Default for BubbleSort {
    fn default() -> Self {
        Self::demo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_end(sort: &mut BubbleSort) -> usize {
        let mut steps = 0;
        while sort.is_sorting() {
            sort.advance();
            steps += 1;
        }
        steps
    }

    #[test]
    fn demo_sequence_sorts() {
        let mut sort = BubbleSort::demo();
        let steps = run_to_end(&mut sort);

        assert_eq!(sort.values(), &[1, 2, 4, 5, 8]);
        assert!(steps <= 5 * 4 / 2);
    }

    #[test]
    fn first_step_swaps_the_leading_pair() {
        let mut sort = BubbleSort::demo();
        assert_eq!(sort.cursor(), Some((0, 1)));
        assert_eq!(sort.advance(), Step::Compared { swapped: true });
        assert_eq!(sort.values(), &[1, 5, 4, 2, 8]);
        assert_eq!(sort.cursor(), Some((1, 2)));
    }

    #[test]
    fn inner_pass_wraps_into_next_outer_pass() {
        let mut sort = BubbleSort::demo();
        for _ in 0..4 {
            sort.advance();
        }
        // the largest value has bubbled to the end, next pass restarts at 0
        assert_eq!(sort.values()[4], 8);
        assert_eq!(sort.cursor(), Some((0, 1)));
    }

    #[test]
    fn bound_holds_for_reversed_input() {
        for len in 2..9u32 {
            let mut sort = BubbleSort::new((0..len).rev().collect());
            let steps = run_to_end(&mut sort);
            let n = len as usize;
            assert!(steps <= n * (n - 1) / 2, "len {len}: {steps} steps");
            assert!(sort.values().windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn view_marks_compared_pair_then_everything_sorted() {
        let mut sort = BubbleSort::demo();
        let view = sort.view();
        assert_eq!(view.control, Control::Step);
        assert_eq!(view.items[0].1, Mark::Compared);
        assert_eq!(view.items[1].1, Mark::Compared);
        assert_eq!(view.items[2].1, Mark::Idle);

        run_to_end(&mut sort);
        let view = sort.view();
        assert_eq!(view.control, Control::Reset);
        assert!(view.items.iter().all(|(_, mark)| *mark == Mark::Sorted));
    }

    #[test]
    fn advancing_a_finished_sort_resets_it() {
        let mut sort = BubbleSort::demo();
        run_to_end(&mut sort);

        assert_eq!(sort.advance(), Step::Reset);
        assert!(sort.is_sorting());
        assert_eq!(sort.values(), &DEMO_SEQUENCE);
        assert_eq!(sort.cursor(), Some((0, 1)));
    }

    #[test]
    fn short_sequences_start_sorted() {
        assert!(!BubbleSort::new(vec![]).is_sorting());
        assert!(!BubbleSort::new(vec![3]).is_sorting());
        assert!(BubbleSort::new(vec![3, 1]).is_sorting());
    }
}
