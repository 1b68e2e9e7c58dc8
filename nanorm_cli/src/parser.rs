use crate::command::{Assignment, Command};

pub fn parse(input: &str) -> Result<Command, String> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err("Empty command".to_string());
    }

    let keyword = tokens[0].to_lowercase();

    match keyword.as_str() {
        "tables" => Ok(Command::Tables),
        "schema" => parse_schema(&tokens),
        "create" => parse_create(&tokens),
        "insert" => parse_insert(&tokens),
        "select" => parse_select(&tokens),
        "update" => parse_update(&tokens),
        _ => Err(format!("Unknown command '{}'", tokens[0])),
    }
}

fn tokenize(input: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(current.clone());
                    current.clear();
                }
            }
            _ => current.push(ch),
        }
    }

    if in_quotes {
        return Err("Unclosed quote (\") in input".to_string());
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

fn parse_schema(tokens: &[String]) -> Result<Command, String> {
    // schema <table>
    if tokens.len() != 2 {
        return Err("Usage: schema <table>".to_string());
    }
    Ok(Command::Schema {
        table: tokens[1].clone(),
    })
}

fn parse_create(tokens: &[String]) -> Result<Command, String> {
    // create <table> <col>:<type> <col>:<type> ...
    if tokens.len() < 3 {
        return Err("Usage: create <table> <col>:<int|str> ...".to_string());
    }
    let columns = tokens[2..]
        .iter()
        .map(|part| split_pair(part, ':', "name:type like key:int"))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Command::Create {
        table: tokens[1].clone(),
        columns,
    })
}

fn parse_insert(tokens: &[String]) -> Result<Command, String> {
    // insert <table> <col>=<value> ...
    if tokens.len() < 3 {
        return Err("Usage: insert <table> <col>=<value> ...".to_string());
    }
    Ok(Command::Insert {
        table: tokens[1].clone(),
        fields: parse_assignments(&tokens[2..])?,
    })
}

fn parse_select(tokens: &[String]) -> Result<Command, String> {
    // select <table> [<col>=<value> ...]
    if tokens.len() < 2 {
        return Err("Usage: select <table> [<col>=<value> ...]".to_string());
    }
    Ok(Command::Select {
        table: tokens[1].clone(),
        filter: parse_assignments(&tokens[2..])?,
    })
}

fn parse_update(tokens: &[String]) -> Result<Command, String> {
    // update <table> [<col>=<value> ...] set <col>=<value> ...
    let usage = "Usage: update <table> [<col>=<value> ...] set <col>=<value> ...";
    if tokens.len() < 4 {
        return Err(usage.to_string());
    }
    let set_pos = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case("set"))
        .ok_or_else(|| usage.to_string())?;
    if set_pos < 2 || set_pos + 1 >= tokens.len() {
        return Err(usage.to_string());
    }
    Ok(Command::Update {
        table: tokens[1].clone(),
        filter: parse_assignments(&tokens[2..set_pos])?,
        assignments: parse_assignments(&tokens[set_pos + 1..])?,
    })
}

fn parse_assignments(tokens: &[String]) -> Result<Vec<Assignment>, String> {
    tokens
        .iter()
        .map(|t| split_pair(t, '=', "col=value like foo=bar"))
        .collect()
}

fn split_pair(s: &str, sep: char, hint: &str) -> Result<(String, String), String> {
    let (name, rest) = s
        .split_once(sep)
        .ok_or_else(|| format!("Bad argument '{s}'. Use {hint}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Bad argument '{s}'. Use {hint}"));
    }
    Ok((name.to_string(), rest.to_string()))
}
