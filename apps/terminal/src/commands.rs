//! # Console Commands
//!
//! Parsing of the operator's input lines. Pure: no session, no I/O.
//!
//! ```text
//! products [query] [cat <categoryId>]
//! categories | reload
//! add <productId> [cut <cutId>] [unit kg|pz] [qty <n>]
//! qty <itemId> <n>            (0 removes the line)
//! cut <itemId> <cutId|none>
//! unit <itemId> kg|pz
//! rm <itemId>
//! cart | clear
//! pay [cash|card|transfer]
//! print [ticketId]
//! summary [YYYY-MM-DD]
//! help | quit
//! ```

use carniceria_core::{PaymentType, Quantity, SaleUnit};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Products {
        query: Option<String>,
        category: Option<i64>,
    },
    Categories,
    Reload,
    Add {
        product_id: i64,
        cut_id: Option<i64>,
        unit: Option<SaleUnit>,
        quantity: Quantity,
    },
    SetQuantity {
        item_id: String,
        quantity: Decimal,
    },
    SetCut {
        item_id: String,
        cut_id: Option<i64>,
    },
    SetUnit {
        item_id: String,
        unit: SaleUnit,
    },
    Remove {
        item_id: String,
    },
    ShowCart,
    Clear,
    Pay {
        payment: Option<PaymentType>,
    },
    Print {
        ticket_id: Option<i64>,
    },
    Summary {
        date: Option<NaiveDate>,
    },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,

    #[error("unknown command '{0}', type 'help'")]
    Unknown(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("invalid {argument}: '{value}'")]
    InvalidArgument {
        argument: &'static str,
        value: String,
    },

    #[error("unexpected '{0}'")]
    Unexpected(String),
}

pub const HELP: &str = "\
Comandos:
  products [texto] [cat <categoría>]               lista o busca productos
  categories                                       lista las categorías
  reload                                           vuelve a cargar el catálogo
  add <producto> [cut <corte>] [unit kg|pz] [qty <n>]
  qty <línea> <n>                                  cambia la cantidad (0 quita)
  cut <línea> <corte|none>                         cambia el corte
  unit <línea> kg|pz                               cambia la unidad
  rm <línea>                                       quita una línea
  cart                                             muestra el carrito
  clear                                            vacía el carrito
  pay [cash|card|transfer]                         cobra y crea el ticket
  print [ticket]                                   imprime el último ticket o uno por número
  summary [AAAA-MM-DD]                             resumen de ventas del día
  help | quit";

/// Parses one input line.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(ParseError::Empty);
    };
    let rest: Vec<&str> = words.collect();

    let command = match head.to_lowercase().as_str() {
        "products" | "p" => parse_products(&rest)?,
        "categories" | "cats" => no_args(&rest, Command::Categories)?,
        "reload" => no_args(&rest, Command::Reload)?,
        "add" | "a" => parse_add(&rest)?,
        "qty" => {
            let [item_id, quantity] = exact::<2>(&rest, "qty", "<line> <quantity>")?;
            Command::SetQuantity {
                item_id: item_id.to_string(),
                quantity: parse_decimal(quantity)?,
            }
        }
        "cut" => {
            let [item_id, cut] = exact::<2>(&rest, "cut", "<line> <cut|none>")?;
            let cut_id = match cut.to_lowercase().as_str() {
                "none" | "-" => None,
                _ => Some(parse_id("cut id", cut)?),
            };
            Command::SetCut {
                item_id: item_id.to_string(),
                cut_id,
            }
        }
        "unit" => {
            let [item_id, unit] = exact::<2>(&rest, "unit", "<line> kg|pz")?;
            Command::SetUnit {
                item_id: item_id.to_string(),
                unit: parse_unit(unit)?,
            }
        }
        "rm" | "remove" => {
            let [item_id] = exact::<1>(&rest, "rm", "<line>")?;
            Command::Remove {
                item_id: item_id.to_string(),
            }
        }
        "cart" | "c" => no_args(&rest, Command::ShowCart)?,
        "clear" => no_args(&rest, Command::Clear)?,
        "pay" => match rest.as_slice() {
            [] => Command::Pay { payment: None },
            [payment] => Command::Pay {
                payment: Some(payment.parse().map_err(|_| ParseError::InvalidArgument {
                    argument: "payment type",
                    value: payment.to_string(),
                })?),
            },
            [_, extra, ..] => return Err(ParseError::Unexpected(extra.to_string())),
        },
        "print" => match rest.as_slice() {
            [] => Command::Print { ticket_id: None },
            [id] => Command::Print {
                ticket_id: Some(parse_id("ticket id", id.trim_start_matches('#'))?),
            },
            [_, extra, ..] => return Err(ParseError::Unexpected(extra.to_string())),
        },
        "summary" => match rest.as_slice() {
            [] => Command::Summary { date: None },
            [date] => Command::Summary {
                date: Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                    ParseError::InvalidArgument {
                        argument: "date",
                        value: date.to_string(),
                    }
                })?),
            },
            [_, extra, ..] => return Err(ParseError::Unexpected(extra.to_string())),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

/// Free text words plus an optional `cat <id>` anywhere in the line.
fn parse_products(args: &[&str]) -> Result<Command, ParseError> {
    let mut words = Vec::new();
    let mut category = None;

    let mut args = args.iter();
    while let Some(word) = args.next() {
        if word.eq_ignore_ascii_case("cat") {
            let raw = args.next().ok_or(ParseError::MissingArgument {
                command: "products",
                argument: "<category>",
            })?;
            category = Some(parse_id("category id", raw)?);
        } else {
            words.push(*word);
        }
    }

    Ok(Command::Products {
        query: (!words.is_empty()).then(|| words.join(" ")),
        category,
    })
}

fn parse_add(args: &[&str]) -> Result<Command, ParseError> {
    let (first, options) = args.split_first().ok_or(ParseError::MissingArgument {
        command: "add",
        argument: "<product>",
    })?;

    let mut command_cut = None;
    let mut command_unit = None;
    let mut quantity = Quantity::one();

    let mut options = options.iter();
    while let Some(option) = options.next() {
        match option.to_lowercase().as_str() {
            "cut" => command_cut = Some(parse_id("cut id", option_value(&mut options, "<cut>")?)?),
            "unit" => command_unit = Some(parse_unit(option_value(&mut options, "kg|pz")?)?),
            "qty" => {
                let raw = option_value(&mut options, "<quantity>")?;
                quantity = raw.parse().map_err(|_| ParseError::InvalidArgument {
                    argument: "quantity",
                    value: raw.to_string(),
                })?;
            }
            _ => return Err(ParseError::Unexpected(option.to_string())),
        }
    }

    Ok(Command::Add {
        product_id: parse_id("product id", first)?,
        cut_id: command_cut,
        unit: command_unit,
        quantity,
    })
}

fn option_value<'a>(
    options: &mut std::slice::Iter<'_, &'a str>,
    argument: &'static str,
) -> Result<&'a str, ParseError> {
    options.next().copied().ok_or(ParseError::MissingArgument {
        command: "add",
        argument,
    })
}

fn exact<'a, const N: usize>(
    args: &[&'a str],
    command: &'static str,
    argument: &'static str,
) -> Result<[&'a str; N], ParseError> {
    if let Some(extra) = args.get(N) {
        return Err(ParseError::Unexpected(extra.to_string()));
    }
    <[&str; N]>::try_from(args).map_err(|_| ParseError::MissingArgument { command, argument })
}

fn no_args(args: &[&str], command: Command) -> Result<Command, ParseError> {
    match args.first() {
        Some(extra) => Err(ParseError::Unexpected(extra.to_string())),
        None => Ok(command),
    }
}

fn parse_id(argument: &'static str, raw: &str) -> Result<i64, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidArgument {
        argument,
        value: raw.to_string(),
    })
}

fn parse_unit(raw: &str) -> Result<SaleUnit, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidArgument {
        argument: "unit",
        value: raw.to_string(),
    })
}

/// Accepts `0,5` as well as `0.5`.
fn parse_decimal(raw: &str) -> Result<Decimal, ParseError> {
    raw.replace(',', ".")
        .parse()
        .map_err(|_| ParseError::InvalidArgument {
            argument: "quantity",
            value: raw.to_string(),
        })
}
