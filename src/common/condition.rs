use crate::common;

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::{Error, Result, to_attribute_value};
use std::{collections, ops};

/// Logical operator for combining conditions.
#[derive(Clone, Debug, PartialEq)]
pub enum LogicalOperator {
    /// All conditions must hold.
    And,
    /// At least one condition must hold.
    Or,
}

impl ops::Deref for LogicalOperator {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Predicate over a single attribute.
///
/// ```rust
/// use dynamodb_users::common::condition;
///
/// let eq = condition::Condition::Equals("USER".to_string());
/// let absent: condition::Condition<String> = condition::Condition::NotExists;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Condition<T> {
    /// The attribute is a string starting with the prefix.
    BeginsWith(String),
    /// The attribute equals the value.
    Equals(T),
    /// The attribute is present on the item.
    Exists,
    /// The attribute is absent from the item.
    NotExists,
}

impl<T: Serialize> Condition<T> {
    fn get_expression(
        self,
        name: &str,
        name_placeholder: &str,
        index: &mut usize,
    ) -> Result<(String, collections::HashMap<String, types::AttributeValue>)> {
        let mut expression_attribute_values = collections::HashMap::new();
        let expression = match self {
            Self::BeginsWith(prefix) => {
                let value_placeholder = format!(":{name}_begins_with{index}");
                *index += 1;
                let expression = format!("begins_with({name_placeholder}, {value_placeholder})");
                expression_attribute_values
                    .insert(value_placeholder, types::AttributeValue::S(prefix));
                expression
            }
            Self::Equals(value) => {
                let value = to_attribute_value(value)?;
                let value_placeholder = format!(":{name}_eq{index}");
                *index += 1;
                let expression = format!("{name_placeholder} = {value_placeholder}");
                expression_attribute_values.insert(value_placeholder, value);
                expression
            }
            Self::Exists => format!("attribute_exists({name_placeholder})"),
            Self::NotExists => format!("attribute_not_exists({name_placeholder})"),
        };
        Ok((expression, expression_attribute_values))
    }
}

/// Condition applied to a named attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyCondition<T> {
    /// The condition to apply to the attribute.
    pub condition: Condition<T>,
    /// The name of the attribute.
    pub name: String,
}

impl<T> KeyCondition<T> {
    /// Builds a condition on the named attribute.
    pub fn new(name: impl Into<String>, condition: Condition<T>) -> Self {
        Self {
            condition,
            name: name.into(),
        }
    }
}

impl<T: Serialize> KeyCondition<T> {
    /// Renders key conditions joined with `AND`, as a Query key condition expression requires.
    pub(crate) fn get_expression_operation(keys: Vec<Self>) -> Result<common::ExpressionInput> {
        let mut index = 0;
        let mut operations = Vec::with_capacity(keys.len());
        for key in keys {
            operations.push(key.get_operation(&mut index)?);
        }
        Ok(common::ExpressionInput::merge(&LogicalOperator::And, operations))
    }

    fn get_operation(self, index: &mut usize) -> Result<common::ExpressionInput> {
        let placeholder = common::placeholder(&self.name);
        let (expression, expression_attribute_values) =
            self.condition.get_expression(&self.name, &placeholder, index)?;
        Ok(common::ExpressionInput {
            expression,
            expression_attribute_names: collections::HashMap::from([(placeholder, self.name)]),
            expression_attribute_values,
        })
    }
}

/// Tree of conditions combined with logical operators.
///
/// ```rust
/// use dynamodb_users::common::condition;
///
/// let item_absent: condition::ConditionMap<String> = condition::ConditionMap::Leaves(
///     condition::LogicalOperator::And,
///     vec![
///         condition::KeyCondition::new("PK", condition::Condition::NotExists),
///         condition::KeyCondition::new("SK", condition::Condition::NotExists),
///     ],
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ConditionMap<T> {
    /// Flat list of conditions combined with the operator.
    Leaves(LogicalOperator, Vec<KeyCondition<T>>),
    /// Nested maps combined with the operator; each composite child is parenthesised.
    Group(LogicalOperator, Vec<ConditionMap<T>>),
}

impl<T: Serialize> TryFrom<ConditionMap<T>> for common::ExpressionInput {
    type Error = Error;

    fn try_from(condition_map: ConditionMap<T>) -> Result<Self> {
        condition_map.get_expression_operation_recursive(&mut 0)
    }
}

impl<T> ConditionMap<T> {
    fn is_composite(&self) -> bool {
        match self {
            Self::Leaves(_, leaves) => leaves.len() > 1,
            Self::Group(_, children) => children.len() > 1,
        }
    }
}

impl<T: Serialize> ConditionMap<T> {
    fn get_expression_operation_recursive(
        self,
        index: &mut usize,
    ) -> Result<common::ExpressionInput> {
        let (operator, operations) = match self {
            Self::Leaves(operator, key_conditions) => {
                let mut operations = Vec::with_capacity(key_conditions.len());
                for key_condition in key_conditions {
                    operations.push(key_condition.get_operation(index)?);
                }
                (operator, operations)
            }
            Self::Group(operator, children) => {
                let mut operations = Vec::with_capacity(children.len());
                for child in children {
                    let is_composite = child.is_composite();
                    let mut operation = child.get_expression_operation_recursive(index)?;
                    if is_composite {
                        operation.expression = format!("({})", operation.expression);
                    }
                    operations.push(operation);
                }
                (operator, operations)
            }
        };
        Ok(common::ExpressionInput::merge(&operator, operations))
    }
}
