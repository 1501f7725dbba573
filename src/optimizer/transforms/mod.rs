//! Built-in optimizer transforms, one module per fix.

pub mod add_to_copy;
pub mod cache_cleanup;
pub mod instruction_case;
pub mod maintainer_to_label;
pub mod merge_run;
pub mod no_install_recommends;
pub mod pin_image_tag;
pub mod remove_sudo;
pub mod reorder_copy;
pub mod workdir_absolute;
