/// Result of running a node once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Work items counted toward aggregates.
    pub count: u64,
    /// Work items actually done, including those of tasks excluded from counting.
    pub raw_count: u64,
    /// The node ran out of input data.
    pub exhausted: bool,
    /// The inputs were rewound during this run.
    pub reset: bool,
}

impl Outcome {
    /// Fold a child's result into this one.
    ///
    /// A child that reset the inputs clears the exhausted state and passes the reset upward;
    /// otherwise an exhausted child makes this node exhausted.
    pub(crate) fn absorb(&mut self, child: &Outcome) {
        self.count += child.count;
        self.raw_count += child.raw_count;
        if child.reset {
            self.exhausted = false;
            self.reset = true;
        } else {
            self.exhausted |= child.exhausted;
        }
    }
}
