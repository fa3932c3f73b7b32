//! Line commands of the interactive `browse` mode.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Search(String),
    Category(String),
    Page(u32),
    Next,
    Prev,
    Size(u32),
    Show(u64),
    Refresh,
    State,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  search <text>      search by free text (clears the category)
  category [value]   filter by category; no value clears the filter
  page <n>           jump to page n
  next | prev        move one page
  size <12|20|40>    change results per page
  show <id>          show details of one result
  refresh            re-run the current query
  state              print the current query state
  help               this text
  quit               leave";

pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "search" | "s" => Ok(ReplCommand::Search(rest.to_string())),
        "category" | "cat" | "c" => Ok(ReplCommand::Category(rest.to_string())),
        "page" | "p" => parse_number(rest, "page").map(ReplCommand::Page),
        "next" | "n" => Ok(ReplCommand::Next),
        "prev" => Ok(ReplCommand::Prev),
        "size" => parse_number(rest, "size").map(ReplCommand::Size),
        "show" => parse_number(rest, "show").map(ReplCommand::Show),
        "refresh" | "r" => Ok(ReplCommand::Refresh),
        "state" => Ok(ReplCommand::State),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        "" => Err("empty command; type `help`".to_string()),
        other => Err(format!("unknown command `{other}`; type `help`")),
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, command: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("`{command}` expects a number, got `{raw}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_keeps_the_rest_of_the_line() {
        assert_eq!(
            parse_command("search  snowy owl "),
            Ok(ReplCommand::Search("snowy owl".into()))
        );
    }

    #[test]
    fn bare_category_clears_the_filter() {
        assert_eq!(parse_command("category"), Ok(ReplCommand::Category(String::new())));
        assert_eq!(
            parse_command("cat food"),
            Ok(ReplCommand::Category("food".into()))
        );
    }

    #[test]
    fn numeric_arguments_are_validated() {
        assert_eq!(parse_command("page 3"), Ok(ReplCommand::Page(3)));
        assert_eq!(parse_command("size 40"), Ok(ReplCommand::Size(40)));
        assert!(parse_command("page three").is_err());
        assert!(parse_command("show").is_err());
    }

    #[test]
    fn unknown_commands_are_rejected() {
        let err = parse_command("dance").expect_err("must fail");
        assert!(err.contains("dance"));
        assert!(parse_command("   ").is_err());
    }
}
