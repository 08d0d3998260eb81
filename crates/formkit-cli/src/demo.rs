//! The built-in demo questionnaire: a small holiday booking form that
//! exercises most control kinds, a display rule, and cross-field
//! validators.

use formkit::{
    BusinessRules, DateType, DrawType, Form, OptionLayout, OptionValue, Options, RuleComparison,
    RuleMatchType, TextType, Validator,
};

pub fn demo_form(draw_type: DrawType) -> (Form, BusinessRules) {
    let mut form = Form::new("Holiday booking", draw_type);
    let about = form.add_section("About you");
    let stay = form.add_section("Your stay");
    let extras = form.add_section_with_rule("Extras", Some("wantsExtras"));

    form.add_question("intro", Some("Welcome"), Some(about))
        .add_label("welcome", "Answer a few questions to book your stay.");

    {
        let question = form.add_question("contact", Some("About you"), Some(about));
        question
            .add_text_control("firstName", TextType::SingleLine, 50, Some("First name"))
            .add_validator(Validator::required("We need your name"));
        question
            .add_text_control("email", TextType::Email, 100, Some("you@example.com"))
            .add_validator(Validator::required("We need an email address"))
            .add_validator(Validator::email("That does not look like an email address"));
        question
            .add_text_control("confirmEmail", TextType::Email, 100, None)
            .add_validator(Validator::answer_must_match(
                "[email]",
                "Must match the email above",
            ));
    }

    {
        let question = form.add_question("dates", Some("Your stay"), Some(stay));
        question
            .add_date_control("checkIn", DateType::Full)
            .add_validator(Validator::required("When do you arrive?"))
            .add_validator(Validator::date("Not a real date"));
        question
            .add_date_control("checkOut", DateType::Full)
            .add_validator(Validator::date("Not a real date"))
            .add_validator(Validator::date_must_be_after(
                "[checkIn]",
                "Check-out must be after check-in",
            ));
        question
            .add_text_control("guests", TextType::Numeric, 2, None)
            .add_validator(Validator::must_be_between("0", "9", "Between 1 and 8 guests"));
    }

    form.add_question("extrasToggle", Some("Anything else?"), Some(stay))
        .add_toggle_control("wantsExtras", Some("Add extras to the booking?"));

    form.add_question("extrasPick", Some("Extras"), Some(extras))
        .set_display_rule("wantsExtras")
        .add_option_control(
            "extra",
            Options::from_list(
                vec![
                    OptionValue::new("SPA", "Spa access"),
                    OptionValue::new("GYM", "Gym pass"),
                    OptionValue::new("LATE", "Late check-out"),
                ],
                None,
            ),
            OptionLayout::Vertical,
        )
        .add_validator(Validator::required("Pick an extra, or go back and answer N"));

    let mut rules = BusinessRules::new();
    rules
        .add_rule("wantsExtras", RuleMatchType::MatchAll)
        .add_part("wantsExtras", RuleComparison::Equals, "Y", None);

    (form, rules)
}
