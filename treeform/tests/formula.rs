use rstest::rstest;
use std::sync::Arc;
use treeform::formula::{BinaryOperator, Component, Token, TokenNode};
use treeform::{ErrorKind, FormulaConverter, TransformError};

fn parse(json: &str) -> Arc<TokenNode> {
    Arc::new(serde_json::from_str(json).unwrap())
}

#[test]
fn nested_expression_from_json() {
    // (price + 2) * qty
    let tree = parse(
        r#"{
            "token": {"operator": "*"},
            "children": [
                {"token": "group", "children": [
                    {"token": {"operator": "+"}, "children": [
                        {"token": {"variable": "price"}},
                        {"token": {"number": 2}}
                    ]}
                ]},
                {"token": {"variable": "qty"}}
            ]
        }"#,
    );

    let formula = FormulaConverter::standard().convert(&tree).unwrap();
    assert_eq!(
        formula.component,
        Component::binary(
            BinaryOperator::Multiply,
            Component::binary(
                BinaryOperator::Add,
                Component::Variable("price".into()),
                Component::Constant(2.0),
            ),
            Component::Variable("qty".into()),
        )
    );
    assert_eq!(formula.component.to_string(), "(price + 2) * qty");
    assert_eq!(formula.variables, vec!["price", "qty"]);
}

#[test]
fn variables_listed_in_first_appearance_order() {
    let tree = TokenNode::call(
        "IF",
        vec![
            TokenNode::binary(
                BinaryOperator::Greater,
                TokenNode::variable("z"),
                TokenNode::variable("a"),
            ),
            TokenNode::variable("a"),
            TokenNode::variable("z"),
        ],
    );
    let formula = FormulaConverter::standard().convert(&tree).unwrap();
    assert_eq!(formula.variables, vec!["z", "a"]);
    assert_eq!(formula.component.to_string(), "IF(z > a, a, z)");
}

#[rstest]
#[case::group_empty(Token::Group, 0, 1)]
#[case::group_pair(Token::Group, 2, 1)]
#[case::operator_single(Token::Operator(BinaryOperator::Divide), 1, 2)]
#[case::operator_triple(Token::Operator(BinaryOperator::Divide), 3, 2)]
#[case::variable_with_child(Token::Variable("v".into()), 1, 0)]
#[case::number_with_child(Token::Number(1.0), 1, 0)]
fn arity_mismatch_is_structural(
    #[case] token: Token,
    #[case] children: usize,
    #[case] expected: usize,
) {
    let tree = TokenNode::branch(
        token,
        (0..children).map(|i| TokenNode::variable(&format!("c{}", i))).collect(),
    );

    let err = FormulaConverter::standard().convert(&tree).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    match err {
        TransformError::Arity {
            expected: e,
            found,
            ..
        } => {
            assert_eq!(e, expected);
            assert_eq!(found, children);
        }
        other => panic!("expected an arity error, got {other:?}"),
    }
}

#[test]
fn arity_error_deep_in_the_tree_discards_everything() {
    let tree = TokenNode::call(
        "SUM",
        vec![
            TokenNode::variable("a"),
            TokenNode::branch(
                Token::Operator(BinaryOperator::Add),
                vec![TokenNode::variable("b")],
            ),
        ],
    );
    let err = FormulaConverter::standard().convert(&tree).unwrap_err();
    assert!(err.to_string().contains("expects 2 children, found 1"));
}
