// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod change_text_case;
mod prefix_suffix_adder;
mod reverse_text;
mod text_length_classifier;
mod token_counter;

pub use change_text_case::ChangeTextCaseEngine;
pub use prefix_suffix_adder::{PrefixSuffixAdderEngine, PrefixSuffixConfig};
pub use reverse_text::ReverseTextEngine;
pub use text_length_classifier::TextLengthClassifierEngine;
pub use token_counter::TokenCounterEngine;
