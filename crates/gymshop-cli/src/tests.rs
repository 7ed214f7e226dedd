use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["gymshop"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_login_with_password_flag() {
    let cli = Cli::try_parse_from([
        "gymshop",
        "login",
        "--email",
        "minh@example.com",
        "--password",
        "pw",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Login { ref email, ref password }) if email == "minh@example.com" && password == "pw"
    ));
}

#[test]
fn services_list_defaults_to_first_page() {
    let cli = Cli::try_parse_from(["gymshop", "services", "list", "--search", "yoga"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Services {
            command: ServicesCommands::List {
                search: Some(ref s),
                page: 1,
                limit: None,
            }
        }) if s == "yoga"
    ));
}

#[test]
fn parses_cart_quantity() {
    let cli = Cli::try_parse_from(["gymshop", "cart", "qty", "12", "3"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Cart {
            command: CartCommands::Qty {
                id: 12,
                quantity: 3
            }
        })
    ));
}

#[test]
fn parses_cart_select_all() {
    let cli = Cli::try_parse_from(["gymshop", "cart", "select-all"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Cart {
            command: CartCommands::SelectAll
        })
    ));
}

#[test]
fn parses_booking_book_with_options() {
    let cli = Cli::try_parse_from([
        "gymshop",
        "booking",
        "book",
        "7",
        "2026-10-05",
        "1",
        "--variant",
        "2",
        "--quantity",
        "2",
    ])
    .unwrap();
    let Some(Commands::Booking {
        command:
            BookingCommands::Book {
                service,
                date,
                slot,
                variant,
                size,
                staff,
                quantity,
            },
    }) = cli.command
    else {
        panic!("expected booking book");
    };
    assert_eq!(service, 7);
    assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 5).unwrap());
    assert_eq!(slot, 1);
    assert_eq!(variant, Some(2));
    assert_eq!(size, None);
    assert_eq!(staff, None);
    assert_eq!(quantity, 2);
}

#[test]
fn rejects_malformed_booking_date() {
    let result = Cli::try_parse_from(["gymshop", "booking", "slots", "7", "05/10/2026"]);
    assert!(result.is_err());
}

#[test]
fn parses_address_set_default() {
    let cli = Cli::try_parse_from(["gymshop", "addresses", "set-default", "4"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Addresses {
            command: AddressCommands::SetDefault { id: 4 }
        })
    ));
}

#[test]
fn parses_vnpay_return_url() {
    let cli = Cli::try_parse_from([
        "gymshop",
        "payment",
        "vnpay-return",
        "https://shop.example.com/return?vnp_ResponseCode=00",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Payment {
            command: PaymentCommands::VnpayReturn { ref url }
        }) if url.contains("vnp_ResponseCode")
    ));
}
