pub mod export;
pub mod formatter;

pub use export::{export_reports, project_rows, projects_to_json, ProjectRow};
pub use formatter::{
    format_catalogue, format_dimension_stats, format_flag_definition, format_flag_summary,
    format_portfolio_summary, format_project_detail, format_ranked_table, format_tsv, should_use_colors,
};
