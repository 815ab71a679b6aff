// Progress analytics: submission-calendar bucketing shared by the student
// dashboard heatmap and the weekly activity chart.

pub mod calendar;
